//! Generation jobs: validation, duplicate detection, the call to the
//! facet generator and the job lifecycle around it.

pub mod client;
pub mod error;
pub mod fingerprint;
pub mod job;
pub mod orchestrator;
pub mod payload;
pub mod sample;

pub use client::{FacetGenerator, FunctionsClient, GENERATE_FUNCTION, INVITE_FUNCTION};
pub use error::GenerationError;
pub use fingerprint::{find_duplicate, fingerprint, job_fingerprint};
pub use job::{GenerationJob, JobStatus};
pub use orchestrator::{
    DedupPolicy, GenerationOutcome, GenerationRequest, GenerationSettings, Orchestrator,
    ValidatedSubmission,
};
pub use payload::{
    AnalyzeRequest, AnalyzeResponse, ContextCategory, GenerateRequest, GenerateResponse,
    InviteRequest, PromptPayload,
};
pub use sample::SampleFacetGenerator;
