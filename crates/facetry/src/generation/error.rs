use thiserror::Error;

use crate::db::DatabaseError;
use crate::error::ValidationError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The function answered with a non-2xx status.
    #[error("Function '{function}' failed with HTTP {status}: {body}")]
    Transport {
        function: String,
        status: u16,
        body: String,
    },

    #[error("Request to '{function}' failed: {message}")]
    Network { function: String, message: String },

    #[error("Unexpected response from '{function}': {message}")]
    InvalidResponse { function: String, message: String },

    /// The call succeeded but produced nothing.
    #[error("Generation for job '{job_id}' produced no facets")]
    NoFacets { job_id: String },

    #[error("Job '{job_id}' not found")]
    JobNotFound { job_id: String },

    #[error("Functions client is not configured: {0}")]
    NotConfigured(String),

    #[error("Access key unavailable: {0}")]
    Secret(#[from] SecretError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl GenerationError {
    /// Failures that happened after the job row was written and therefore
    /// mark that job failed.
    pub fn fails_job(&self) -> bool {
        matches!(
            self,
            GenerationError::Transport { .. }
                | GenerationError::Network { .. }
                | GenerationError::InvalidResponse { .. }
                | GenerationError::NoFacets { .. }
                | GenerationError::Database(_)
        )
    }
}
