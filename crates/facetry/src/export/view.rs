//! Generated facets grouped into per-category tabs, with row, tab and
//! global selection.

use std::collections::HashSet;

use crate::facets::RecommendedFacet;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup {
    pub category_id: String,
    pub facets: Vec<RecommendedFacet>,
}

#[derive(Debug, Clone, Default)]
pub struct ResultView {
    groups: Vec<ResultGroup>,
    selected: HashSet<String>,
    active_tab: Option<String>,
}

impl ResultView {
    /// Groups by `category_id`, tabs in order of first appearance. The first
    /// tab is active. Nothing is selected.
    pub fn new(facets: Vec<RecommendedFacet>) -> Self {
        let mut groups: Vec<ResultGroup> = Vec::new();
        for facet in facets {
            match groups.iter_mut().find(|g| g.category_id == facet.category_id) {
                Some(group) => group.facets.push(facet),
                None => groups.push(ResultGroup {
                    category_id: facet.category_id.clone(),
                    facets: vec![facet],
                }),
            }
        }
        let active_tab = groups.first().map(|g| g.category_id.clone());
        Self {
            groups,
            selected: HashSet::new(),
            active_tab,
        }
    }

    pub fn groups(&self) -> &[ResultGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.facets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn active_tab(&self) -> Option<&str> {
        self.active_tab.as_deref()
    }

    /// Switches tabs. Unknown tabs are ignored and return false.
    pub fn set_active_tab(&mut self, category_id: &str) -> bool {
        if self.group(category_id).is_none() {
            return false;
        }
        self.active_tab = Some(category_id.to_string());
        true
    }

    pub fn active_facets(&self) -> &[RecommendedFacet] {
        self.active_tab
            .as_deref()
            .and_then(|tab| self.group(tab))
            .map(|g| g.facets.as_slice())
            .unwrap_or_default()
    }

    fn group(&self, category_id: &str) -> Option<&ResultGroup> {
        self.groups.iter().find(|g| g.category_id == category_id)
    }

    fn contains_facet(&self, facet_id: &str) -> bool {
        self.groups
            .iter()
            .flat_map(|g| g.facets.iter())
            .any(|f| f.id == facet_id)
    }

    pub fn is_selected(&self, facet_id: &str) -> bool {
        self.selected.contains(facet_id)
    }

    /// Flips one row. Returns whether it is selected afterwards; unknown ids
    /// stay unselected.
    pub fn toggle(&mut self, facet_id: &str) -> bool {
        if self.selected.remove(facet_id) {
            return false;
        }
        if !self.contains_facet(facet_id) {
            return false;
        }
        self.selected.insert(facet_id.to_string());
        true
    }

    /// Selects or clears every row of one tab. Other tabs are untouched.
    pub fn set_tab_selected(&mut self, category_id: &str, selected: bool) {
        let ids: Vec<String> = match self.group(category_id) {
            Some(g) => g.facets.iter().map(|f| f.id.clone()).collect(),
            None => return,
        };
        for id in ids {
            if selected {
                self.selected.insert(id);
            } else {
                self.selected.remove(&id);
            }
        }
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        if selected {
            self.selected = self
                .groups
                .iter()
                .flat_map(|g| g.facets.iter())
                .map(|f| f.id.clone())
                .collect();
        } else {
            self.selected.clear();
        }
    }

    /// True when the tab has rows and all of them are selected.
    pub fn tab_all_selected(&self, category_id: &str) -> bool {
        self.group(category_id)
            .map(|g| !g.facets.is_empty() && g.facets.iter().all(|f| self.is_selected(&f.id)))
            .unwrap_or(false)
    }

    /// True when there are rows and every row in every tab is selected.
    pub fn all_selected(&self) -> bool {
        !self.is_empty() && self.selected.len() == self.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected rows in display order: tab by tab, rank order within a tab.
    pub fn selected_facets(&self) -> Vec<&RecommendedFacet> {
        self.groups
            .iter()
            .flat_map(|g| g.facets.iter())
            .filter(|f| self.is_selected(&f.id))
            .collect()
    }
}
