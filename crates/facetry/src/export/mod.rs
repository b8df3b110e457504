//! Result viewing and CSV export.

pub mod columns;
pub mod view;
pub mod writer;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::catalog::Category;
use crate::context::ClientContext;
use crate::db::{export_repo, Database};
use crate::error::ExportError;
use crate::generation::GenerationJob;

pub use columns::{Column, ColumnMapping, COLUMN_COUNT, DEFAULT_COLUMNS};
pub use view::{ResultGroup, ResultView};
pub use writer::write_csv;

pub const CSV_FORMAT: &str = "csv";

/// One row of the export audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: String,
    pub job_id: String,
    pub client_id: String,
    pub category_ids: Vec<String>,
    pub format: String,
    pub exported_by: String,
    pub created_at: String,
}

impl ExportRecord {
    pub fn new(
        job_id: impl Into<String>,
        client_id: impl Into<String>,
        category_ids: Vec<String>,
        exported_by: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            job_id: job_id.into(),
            client_id: client_id.into(),
            category_ids,
            format: CSV_FORMAT.to_string(),
            exported_by: exported_by.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A rendered export, ready to be saved or offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

impl ExportArtifact {
    /// Writes the file into `dir` and returns its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents).map_err(|source| ExportError::WriteFile {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn file_name(job: &GenerationJob) -> String {
    let stem: String = job
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(job.id.as_str())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    format!(
        "facets-{}-{}.csv",
        if stem.is_empty() { "export" } else { stem },
        chrono::Utc::now().format("%Y%m%d")
    )
}

/// Exports the selected rows with the job's own headers, or the defaults.
pub fn export_selected(
    db: &Database,
    ctx: &ClientContext,
    job: &GenerationJob,
    view: &ResultView,
    categories: &[Category],
) -> Result<ExportArtifact, ExportError> {
    export_selected_with(db, ctx, job, view, categories, &DEFAULT_COLUMNS)
}

/// Like [`export_selected`], with `fallback` headers for jobs that carry
/// no `output_format.columns`.
pub fn export_selected_with<S: AsRef<str>>(
    db: &Database,
    ctx: &ClientContext,
    job: &GenerationJob,
    view: &ResultView,
    categories: &[Category],
    fallback: &[S],
) -> Result<ExportArtifact, ExportError> {
    let _span = info_span!("export", job_id = %job.id).entered();

    if ctx.active_client()? != job.client_id {
        return Err(ExportError::JobNotFound {
            job_id: job.id.clone(),
        });
    }
    let selected = view.selected_facets();
    if selected.is_empty() {
        return Err(ExportError::NothingSelected);
    }

    let mapping = ColumnMapping::from_job_metadata(&job.metadata, fallback);
    let contents = write_csv(&mapping, &selected, categories);

    let mut category_ids: Vec<String> = Vec::new();
    for facet in &selected {
        if !category_ids.contains(&facet.category_id) {
            category_ids.push(facet.category_id.clone());
        }
    }
    let record = ExportRecord::new(&job.id, &job.client_id, category_ids, &ctx.user_id);
    export_repo::append(db, &record)?;

    info!(rows = selected.len(), "Export written");
    Ok(ExportArtifact {
        file_name: file_name(job),
        contents,
    })
}
