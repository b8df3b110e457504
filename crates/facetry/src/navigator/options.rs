//! Derived views over the category list: dropdown options, global search
//! results and what the current selection resolves to.

use std::collections::BTreeSet;

use super::state::{NavigatorState, MAX_LEVELS};
use crate::catalog::{path, Category};

/// What the current contiguous selection points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// A category whose path equals the selection.
    Exact(String),
    /// No exact match, but these categories lie below the selection.
    Descendants { path: String, ids: Vec<String> },
    Nothing,
}

/// Options selectable at a 1-based `level`, narrowed by that level's filter.
///
/// Empty when any ancestor level is unset.
pub fn level_options(categories: &[Category], state: &NavigatorState, level: usize) -> Vec<String> {
    if !(1..=MAX_LEVELS).contains(&level) || !state.has_ancestors(level) {
        return Vec::new();
    }

    let ancestor = state.ancestor_path(level);
    let filter = state.filter(level).trim().to_lowercase();

    let options: BTreeSet<&str> = categories
        .iter()
        .filter(|c| c.is_visible)
        .filter(|c| match &ancestor {
            Some(prefix) => path::is_at_or_under(&c.category_path, prefix),
            None => true,
        })
        .filter_map(|c| c.segments().get(level - 1).copied())
        .filter(|segment| filter.is_empty() || segment.to_lowercase().contains(&filter))
        .collect();

    options.into_iter().map(str::to_string).collect()
}

/// Categories whose full path contains the global search text, limited to
/// the already-selected prefix.
pub fn global_search<'a>(
    categories: &'a [Category],
    state: &NavigatorState,
    limit: usize,
) -> Vec<&'a Category> {
    let query = state.global_search().trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let prefix = state.selected_path();

    categories
        .iter()
        .filter(|c| c.is_visible)
        .filter(|c| match &prefix {
            Some(prefix) => path::is_at_or_under(&c.category_path, prefix),
            None => true,
        })
        .filter(|c| c.category_path.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

pub fn resolve_selection(categories: &[Category], state: &NavigatorState) -> PathResolution {
    let Some(selected) = state.selected_path() else {
        return PathResolution::Nothing;
    };

    let visible = || categories.iter().filter(|c| c.is_visible);

    if let Some(exact) = visible().find(|c| c.category_path == selected) {
        return PathResolution::Exact(exact.id.clone());
    }

    let ids: Vec<String> = visible()
        .filter(|c| path::is_strictly_under(&c.category_path, &selected))
        .map(|c| c.id.clone())
        .collect();

    if ids.is_empty() {
        PathResolution::Nothing
    } else {
        PathResolution::Descendants {
            path: selected,
            ids,
        }
    }
}
