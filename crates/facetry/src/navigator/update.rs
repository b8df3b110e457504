//! Navigator reducer.
//!
//! ```text
//! update : Msg -> State -> (State, Cmd)
//! ```
//!
//! The reducer is pure. Timers and queue writes are returned as [`Cmd`]s
//! for the caller to execute.

use std::time::Duration;

use super::msg::Msg;
use super::options::{resolve_selection, PathResolution};
use super::state::{NavigatorState, AUTO_RESET_LEVEL, CASCADE_BELOW, MAX_LEVELS};
use crate::catalog::{path, Category};

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    None,
    Batch(Vec<Cmd>),
    /// Arm the inactivity timer; deliver `Msg::AutoResetElapsed(token)` later.
    ScheduleAutoReset { token: u64, after: Duration },
    /// Disarm any running inactivity timer.
    CancelAutoReset,
    /// Add one category to the selection queue.
    Enqueue(String),
    /// Ask the user before adding every descendant of `path`.
    ConfirmBulkAdd { path: String, ids: Vec<String> },
    SetStatus(String),
}

impl Cmd {
    pub fn batch(cmds: Vec<Cmd>) -> Cmd {
        let mut cmds: Vec<Cmd> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Cmd::None))
            .collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.pop().unwrap_or(Cmd::None),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Flattens nested batches into a list.
    pub fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::into_vec).collect(),
            other => vec![other],
        }
    }
}

/// Tunables the reducer needs.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSettings {
    pub auto_reset_after: Duration,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            auto_reset_after: Duration::from_secs(3),
        }
    }
}

fn valid_level(level: usize) -> bool {
    (1..=MAX_LEVELS).contains(&level)
}

/// Disarms a pending reset, returning the command to stop its timer.
fn disarm(state: &mut NavigatorState) -> Cmd {
    match state.pending_reset.take() {
        Some(_) => Cmd::CancelAutoReset,
        None => Cmd::None,
    }
}

fn clear_from(state: &mut NavigatorState, level: usize) {
    for slot in level.saturating_sub(1)..MAX_LEVELS {
        state.selections[slot] = None;
        state.filters[slot].clear();
    }
}

pub fn update(
    mut state: NavigatorState,
    msg: Msg,
    categories: &[Category],
    settings: &UpdateSettings,
) -> (NavigatorState, Cmd) {
    match msg {
        Msg::SelectLevel { level, value } => {
            if !valid_level(level) {
                return (state, Cmd::None);
            }
            state.selections[level - 1] = Some(value);
            state.filters[level - 1].clear();
            state.open_level = None;
            if level < CASCADE_BELOW {
                clear_from(&mut state, level + 1);
            }

            if level == AUTO_RESET_LEVEL {
                let cancel = disarm(&mut state);
                let token = state.next_token;
                state.next_token += 1;
                state.pending_reset = Some(token);
                let schedule = Cmd::ScheduleAutoReset {
                    token,
                    after: settings.auto_reset_after,
                };
                (state, Cmd::batch(vec![cancel, schedule]))
            } else {
                let cmd = disarm(&mut state);
                (state, cmd)
            }
        }

        Msg::ClearLevel(level) => {
            if !valid_level(level) {
                return (state, Cmd::None);
            }
            clear_from(&mut state, level);
            let cmd = disarm(&mut state);
            (state, cmd)
        }

        Msg::SetFilter { level, text } => {
            if !valid_level(level) {
                return (state, Cmd::None);
            }
            state.filters[level - 1] = text;
            let cmd = disarm(&mut state);
            (state, cmd)
        }

        Msg::OpenDropdown(level) => {
            if !valid_level(level) || !state.has_ancestors(level) {
                return (state, Cmd::None);
            }
            state.open_level = Some(level);
            let cmd = disarm(&mut state);
            (state, cmd)
        }

        Msg::CloseDropdown => {
            state.open_level = None;
            (state, Cmd::None)
        }

        Msg::SetGlobalSearch(text) => {
            state.global_search = text;
            let cmd = disarm(&mut state);
            (state, cmd)
        }

        Msg::PickSearchResult(full_path) => {
            let segments = path::segments(&full_path);
            for slot in 0..MAX_LEVELS {
                state.selections[slot] = segments.get(slot).map(|s| s.to_string());
                state.filters[slot].clear();
            }
            state.global_search.clear();
            state.open_level = None;
            let cmd = disarm(&mut state);
            (state, cmd)
        }

        Msg::AutoResetElapsed(token) => {
            if state.pending_reset != Some(token) {
                // Superseded by later activity.
                return (state, Cmd::None);
            }
            state.pending_reset = None;
            clear_from(&mut state, 1);
            state.open_level = None;
            (state, Cmd::None)
        }

        Msg::AddSelectionToQueue => {
            let cmd = match resolve_selection(categories, &state) {
                PathResolution::Exact(id) => Cmd::Enqueue(id),
                PathResolution::Descendants { path, ids } => Cmd::ConfirmBulkAdd { path, ids },
                PathResolution::Nothing => {
                    Cmd::SetStatus("No category matches the current selection".to_string())
                }
            };
            (state, cmd)
        }

        Msg::ClearAll => {
            let cmd = disarm(&mut state);
            clear_from(&mut state, 1);
            state.global_search.clear();
            state.open_level = None;
            (state, cmd)
        }
    }
}
