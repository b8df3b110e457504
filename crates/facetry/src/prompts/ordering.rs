//! Execution order and required-set rules for selected prompts.

use super::template::{INDUSTRY_ANALYSIS, MASTER_PROMPT};
use crate::error::ValidationError;

/// Canonical order used when the configuration does not provide one.
pub const DEFAULT_EXECUTION_ORDER: &[&str] = &[
    INDUSTRY_ANALYSIS,
    "Category Analysis",
    "Competitor Analysis",
    "Customer Insights",
    "Filter Recommendations",
    MASTER_PROMPT,
];

pub const DEFAULT_REQUIRED: &[&str] = &[INDUSTRY_ANALYSIS, MASTER_PROMPT];

fn rank(name: &str, execution_order: &[String]) -> (u8, usize) {
    if name == INDUSTRY_ANALYSIS {
        (0, 0)
    } else if name == MASTER_PROMPT {
        (3, 0)
    } else {
        match execution_order.iter().position(|n| n == name) {
            Some(pos) => (1, pos),
            None => (2, 0),
        }
    }
}

/// Sorts prompts into execution order.
///
/// Industry Analysis runs first and Master Prompt last. Everything else
/// follows `execution_order`; names it does not list go after the known
/// ones, alphabetically.
pub fn sort_for_execution<T, F>(prompts: &mut [T], execution_order: &[String], name_of: F)
where
    F: Fn(&T) -> &str,
{
    prompts.sort_by(|a, b| {
        let (na, nb) = (name_of(a), name_of(b));
        rank(na, execution_order)
            .cmp(&rank(nb, execution_order))
            .then_with(|| na.cmp(nb))
    });
}

/// Passes when at least one selected name is in the required set.
pub fn check_required<S: AsRef<str>>(
    selected_names: &[S],
    required: &[String],
) -> Result<(), ValidationError> {
    let satisfied = selected_names
        .iter()
        .any(|name| required.iter().any(|r| r == name.as_ref()));
    if satisfied {
        Ok(())
    } else {
        Err(ValidationError::MissingRequiredPrompt {
            required: required.to_vec(),
        })
    }
}
