//! Export header mapping.

use serde_json::Value;

pub const COLUMN_COUNT: usize = 9;

pub const DEFAULT_COLUMNS: [&str; COLUMN_COUNT] = [
    "A. Category ID",
    "B. Category",
    "C. Filter Attributes",
    "D. Possible Values",
    "E. Filling Percentage",
    "F. Priority",
    "G. Confidence Score",
    "H. Number of Sources",
    "I. Source URLs",
];

/// What each of the nine positions holds. Headers can be renamed, the
/// order of contents cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    CategoryId,
    CategoryName,
    FacetName,
    PossibleValues,
    FillingPercentage,
    Priority,
    ConfidenceScore,
    NumSources,
    SourceUrls,
}

pub const COLUMN_ORDER: [Column; COLUMN_COUNT] = [
    Column::CategoryId,
    Column::CategoryName,
    Column::FacetName,
    Column::PossibleValues,
    Column::FillingPercentage,
    Column::Priority,
    Column::ConfidenceScore,
    Column::NumSources,
    Column::SourceUrls,
];

impl Column {
    /// Numeric columns are written unquoted.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::FillingPercentage | Column::ConfidenceScore | Column::NumSources
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    headers: Vec<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new(&DEFAULT_COLUMNS)
    }
}

impl ColumnMapping {
    /// Positional headers. Missing positions fall back to the defaults and
    /// anything past the ninth is ignored.
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let headers = DEFAULT_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, default)| {
                headers
                    .get(i)
                    .map(|h| h.as_ref().trim())
                    .filter(|h| !h.is_empty())
                    .unwrap_or(*default)
                    .to_string()
            })
            .collect();
        Self { headers }
    }

    /// Reads `output_format.columns` from job metadata, else uses `fallback`.
    pub fn from_job_metadata<S: AsRef<str>>(metadata: &Value, fallback: &[S]) -> Self {
        let configured = metadata
            .pointer("/output_format/columns")
            .and_then(Value::as_array)
            .map(|cols| {
                cols.iter()
                    .map(|c| c.as_str().unwrap_or_default().to_string())
                    .collect::<Vec<_>>()
            });
        match configured {
            Some(cols) => Self::new(&cols),
            None => Self::new(fallback),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> impl Iterator<Item = (Column, &str)> {
        COLUMN_ORDER
            .iter()
            .copied()
            .zip(self.headers.iter().map(String::as_str))
    }
}
