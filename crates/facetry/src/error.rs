use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FacetryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Generation error: {0}")]
    Generation(#[from] crate::generation::GenerationError),

    #[error("Queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

/// Errors caught before any network call or database write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No client is associated with user '{user_id}'")]
    MissingClient { user_id: String },

    #[error("Only super admins may act on behalf of another client")]
    ImpersonationDenied,

    #[error("The selection queue is empty")]
    EmptyQueue,

    #[error("Select at least one of the required prompts: {}", required.join(", "))]
    MissingRequiredPrompt { required: Vec<String> },

    #[error("Unknown prompt template '{0}'")]
    UnknownPrompt(String),

    #[error("Analysis level must be 1, 2 or 3 (got {0})")]
    InvalidAnalysisLevel(u8),

    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read import file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV header has no '{column}' column")]
    MissingColumn { column: String },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing selected for export")]
    NothingSelected,

    #[error("Job '{job_id}' not found")]
    JobNotFound { job_id: String },

    #[error("Failed to write export file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not record export: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, FacetryError>;
