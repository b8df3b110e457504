//! Navigator state.
//!
//! The state is a plain value. It is only advanced through
//! [`super::update::update`]; callers read it through the accessors below.

use crate::catalog::path;

/// Deepest hierarchy level the navigator tracks.
pub const MAX_LEVELS: usize = 6;

/// Levels below this one clear their descendants when changed.
pub const CASCADE_BELOW: usize = 3;

/// Selecting a category at this level arms the inactivity reset.
pub const AUTO_RESET_LEVEL: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigatorState {
    pub(super) selections: [Option<String>; MAX_LEVELS],
    pub(super) filters: [String; MAX_LEVELS],
    pub(super) open_level: Option<usize>,
    pub(super) global_search: String,
    /// Token of the armed inactivity reset, if any.
    pub(super) pending_reset: Option<u64>,
    pub(super) next_token: u64,
}

impl NavigatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected segment at a 1-based level.
    pub fn selection(&self, level: usize) -> Option<&str> {
        if !(1..=MAX_LEVELS).contains(&level) {
            return None;
        }
        self.selections[level - 1].as_deref()
    }

    pub fn selections(&self) -> &[Option<String>; MAX_LEVELS] {
        &self.selections
    }

    /// Filter text typed into a level's dropdown.
    pub fn filter(&self, level: usize) -> &str {
        if !(1..=MAX_LEVELS).contains(&level) {
            return "";
        }
        &self.filters[level - 1]
    }

    pub fn open_level(&self) -> Option<usize> {
        self.open_level
    }

    pub fn global_search(&self) -> &str {
        &self.global_search
    }

    pub fn pending_reset(&self) -> Option<u64> {
        self.pending_reset
    }

    /// Length of the contiguous run of selected levels starting at level 1.
    pub fn active_depth(&self) -> usize {
        self.selections
            .iter()
            .take_while(|s| s.is_some())
            .count()
    }

    /// True if levels `1..level` are all selected.
    pub fn has_ancestors(&self, level: usize) -> bool {
        level >= 1 && self.active_depth() >= level - 1
    }

    /// Path of the contiguous selected prefix, or `None` if level 1 is unset.
    pub fn selected_path(&self) -> Option<String> {
        self.ancestor_path(self.active_depth() + 1)
    }

    /// Path formed by levels `1..level`, when all of them are selected.
    pub fn ancestor_path(&self, level: usize) -> Option<String> {
        if level < 2 || !self.has_ancestors(level) {
            return None;
        }
        let segments: Vec<&str> = self.selections[..level - 1]
            .iter()
            .filter_map(|s| s.as_deref())
            .collect();
        Some(path::join(&segments))
    }

    pub fn is_empty(&self) -> bool {
        self.selections.iter().all(|s| s.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(selections: &[Option<&str>]) -> NavigatorState {
        let mut state = NavigatorState::new();
        for (i, s) in selections.iter().enumerate() {
            state.selections[i] = s.map(str::to_string);
        }
        state
    }

    #[test]
    fn test_active_depth_stops_at_gap() {
        let state = with(&[Some("Marine"), None, Some("Life Jackets")]);
        assert_eq!(state.active_depth(), 1);
        assert_eq!(state.selected_path().as_deref(), Some("Marine"));
        assert!(!state.has_ancestors(4));
    }

    #[test]
    fn test_ancestor_path() {
        let state = with(&[Some("Marine"), Some("Safety")]);
        assert_eq!(state.ancestor_path(3).as_deref(), Some("Marine > Safety"));
        assert_eq!(state.ancestor_path(1), None);
        assert_eq!(state.ancestor_path(4), None);
    }

    #[test]
    fn test_out_of_range_levels() {
        let state = NavigatorState::new();
        assert_eq!(state.selection(0), None);
        assert_eq!(state.selection(7), None);
        assert_eq!(state.filter(9), "");
        assert!(state.is_empty());
    }
}
