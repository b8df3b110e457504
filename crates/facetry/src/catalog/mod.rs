//! Category store: the flat, per-client list of taxonomy nodes.

pub mod category;
pub mod import;
pub mod path;

pub use category::Category;
pub use import::{import_file, import_reader, ImportReport};
