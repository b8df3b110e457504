//! Messages for the navigator reducer.
//!
//! Every user action on the category picker is one of these. They describe
//! what happened; [`super::update::update`] decides what it means.

/// All possible navigator actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A value was picked from a level's dropdown (1-based level).
    SelectLevel { level: usize, value: String },
    /// A level was cleared, together with every deeper level.
    ClearLevel(usize),
    /// Filter text typed into a level's dropdown.
    SetFilter { level: usize, text: String },
    OpenDropdown(usize),
    CloseDropdown,
    /// Text typed into the global path search box.
    SetGlobalSearch(String),
    /// A global search hit was picked; carries its full path.
    PickSearchResult(String),
    /// The inactivity timer with this token ran out.
    AutoResetElapsed(u64),
    /// The user asked to queue whatever the selection points at.
    AddSelectionToQueue,
    /// Reset every selection, filter and search.
    ClearAll,
}
