//! Level-based drill-down over the category hierarchy.
//!
//! [`NavigatorState`] is advanced only by [`update`]; dropdown contents and
//! search hits are derived from it by the functions in [`options`].

pub mod msg;
pub mod options;
pub mod state;
pub mod update;

pub use msg::Msg;
pub use options::{global_search, level_options, resolve_selection, PathResolution};
pub use state::{NavigatorState, MAX_LEVELS};
pub use update::{update, Cmd, UpdateSettings};
