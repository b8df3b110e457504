use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the storage layer.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database directory could not be prepared.
    #[error("cannot prepare '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema upgrade v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A JSON column could not be encoded or decoded.
    #[error("column '{column}' holds malformed JSON: {source}")]
    Json {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A stored enum column holds a value this build does not know.
    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    /// The row the caller asked for does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// A thread panicked while holding the connection.
    #[error("connection mutex poisoned")]
    LockPoisoned,
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
