//! The per-user selection queue and the runtime pieces around it.

pub mod persist;
pub mod selection;
pub mod timer;

use thiserror::Error;

pub use persist::{QueuePersister, QueueStore};
pub use selection::SelectionQueue;
pub use timer::InactivityTimer;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Queue storage failed: {0}")]
    Storage(#[from] crate::db::DatabaseError),

    #[error("Queue persister has shut down")]
    Closed,
}
