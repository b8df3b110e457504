//! Bulk category import from breadcrumb CSV files.
//!
//! The file must have a header row with a `breadcrumbs` column; any other
//! columns are ignored. A row that fails to insert does not stop the batch.

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, info_span, warn};

use super::Category;
use crate::db::{category_repo, Database};
use crate::error::ImportError;

const BREADCRUMB_COLUMN: &str = "breadcrumbs";

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    /// Rows with no usable name.
    pub skipped: usize,
    /// Rows the database refused (usually duplicate paths).
    pub failed: usize,
    /// One message per failed row, prefixed with its line number.
    pub errors: Vec<String>,
}

/// Parses breadcrumb CSV content into categories without touching the database.
///
/// Returns each category with its source line, and the number of rows
/// skipped for having no name.
pub fn parse_breadcrumbs<R: Read>(
    client_id: &str,
    reader: R,
) -> Result<(Vec<(u64, Category)>, usize), ImportError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let column = csv
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(BREADCRUMB_COLUMN))
        .ok_or_else(|| ImportError::MissingColumn {
            column: BREADCRUMB_COLUMN.to_string(),
        })?;

    let mut categories = Vec::new();
    let mut skipped = 0;
    for record in csv.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match record
            .get(column)
            .and_then(|raw| Category::from_breadcrumb(client_id, raw))
        {
            Some(category) => categories.push((line, category)),
            None => skipped += 1,
        }
    }
    Ok((categories, skipped))
}

/// Imports categories for `client_id` from CSV content.
pub fn import_reader<R: Read>(
    db: &Database,
    client_id: &str,
    reader: R,
) -> Result<ImportReport, ImportError> {
    let _span = info_span!("catalog.import", client_id).entered();

    let (categories, skipped) = parse_breadcrumbs(client_id, reader)?;
    let mut report = ImportReport {
        skipped,
        ..Default::default()
    };

    for (line, category) in &categories {
        match category_repo::insert(db, category) {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                warn!(path = %category.category_path, "Category insert failed: {}", e);
                report.failed += 1;
                report
                    .errors
                    .push(format!("row {}: {}: {}", line, category.category_path, e));
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed,
        "Category import finished"
    );
    Ok(report)
}

/// Imports categories from a CSV file on disk.
pub fn import_file(
    db: &Database,
    client_id: &str,
    path: &Path,
) -> Result<ImportReport, ImportError> {
    let file = std::fs::File::open(path).map_err(|e| ImportError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    import_reader(db, client_id, file)
}
