//! CSV rendering of selected facets.
//!
//! Text cells are always quoted with internal quotes doubled, including text
//! that looks numeric such as a category id. Numeric cells are written bare.

use std::collections::HashMap;

use super::columns::{Column, ColumnMapping};
use crate::catalog::Category;
use crate::facets::RecommendedFacet;

const MISSING_TEXT: &str = "N/A";

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn text_or_missing(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        MISSING_TEXT
    } else {
        value
    }
}

fn number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn cell(column: Column, facet: &RecommendedFacet, categories: &HashMap<&str, &Category>) -> String {
    match column {
        Column::CategoryId => quote(text_or_missing(&facet.category_id)),
        Column::CategoryName => quote(
            categories
                .get(facet.category_id.as_str())
                .map(|c| c.category_path.as_str())
                .map(text_or_missing)
                .unwrap_or(MISSING_TEXT),
        ),
        Column::FacetName => quote(text_or_missing(&facet.facet_name)),
        Column::PossibleValues => quote(text_or_missing(&facet.possible_values)),
        Column::FillingPercentage => number(facet.filling_percentage),
        Column::Priority => quote(facet.priority.as_str()),
        Column::ConfidenceScore => facet.confidence_score.to_string(),
        Column::NumSources => facet.num_sources.to_string(),
        Column::SourceUrls => quote(text_or_missing(&facet.source_urls.join(", "))),
    }
}

/// Renders header plus one line per facet, each ending in `\n`.
pub fn write_csv(mapping: &ColumnMapping, facets: &[&RecommendedFacet], categories: &[Category]) -> String {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();
    let columns: Vec<Column> = mapping.columns().map(|(c, _)| c).collect();

    let mut out = String::new();
    let header: Vec<String> = mapping.headers().iter().map(|h| quote(h)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for facet in facets {
        let row: Vec<String> = columns.iter().map(|&c| cell(c, facet, &by_id)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
