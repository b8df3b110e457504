pub mod catalog;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod export;
pub mod facets;
pub mod generation;
pub mod navigator;
pub mod prompts;
pub mod queue;
pub mod secrets;

pub use catalog::{import_file, import_reader, Category, ImportReport};
pub use config::{load_config, load_or_default, Config};
pub use context::{ClientContext, Role};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, ExportError, FacetryError, ImportError, Result, ValidationError};
pub use export::{export_selected, ColumnMapping, ExportArtifact, ExportRecord, ResultView};
pub use facets::{Priority, RecommendedFacet};
pub use generation::{
    DedupPolicy, FacetGenerator, FunctionsClient, GenerationError, GenerationJob, GenerationOutcome,
    GenerationRequest, GenerationSettings, JobStatus, Orchestrator, SampleFacetGenerator,
};
pub use navigator::{update, Cmd, Msg, NavigatorState, UpdateSettings};
pub use prompts::{PromptOverride, PromptTemplate, ResolvedPrompt};
pub use queue::{InactivityTimer, QueueError, QueuePersister, QueueStore, SelectionQueue};
pub use secrets::{SecretError, SecretSource};
