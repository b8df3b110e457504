//! Prompt templates, per-client overrides and the rules for combining them
//! into a generation request.

pub mod ordering;
pub mod template;

pub use ordering::{check_required, sort_for_execution, DEFAULT_EXECUTION_ORDER, DEFAULT_REQUIRED};
pub use template::{PromptOverride, PromptTemplate, ResolvedPrompt, INDUSTRY_ANALYSIS, MASTER_PROMPT};
