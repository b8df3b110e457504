use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle of a generation job.
///
/// `Pending` is only used by placeholder projects. Submitted jobs start in
/// `Processing` and end in `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationJob {
    pub id: String,
    pub client_id: String,
    pub created_by: String,
    pub name: Option<String>,
    pub category_ids: Vec<String>,
    /// Prompt template ids, in execution order.
    pub selected_prompts: Vec<String>,
    pub status: JobStatus,
    pub total_categories: u32,
    pub processed_categories: u32,
    pub progress: u8,
    pub metadata: serde_json::Value,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl GenerationJob {
    /// A fresh job row for `client_id`, not yet stored.
    pub fn new(
        client_id: impl Into<String>,
        created_by: impl Into<String>,
        category_ids: Vec<String>,
        selected_prompts: Vec<String>,
        status: JobStatus,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            created_by: created_by.into(),
            name: None,
            total_categories: category_ids.len() as u32,
            category_ids,
            selected_prompts,
            status,
            processed_categories: 0,
            progress: 0,
            metadata: serde_json::Value::Object(Default::default()),
            error: None,
            created_at: now.clone(),
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
