use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Facet priority. Sorts High first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Case-insensitive parse. Unrecognised text maps to Medium.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Facet fields before the row is ranked and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetDraft {
    pub category_id: String,
    pub facet_name: String,
    pub possible_values: String,
    pub filling_percentage: f64,
    pub priority: Priority,
    pub confidence_score: u8,
    pub num_sources: u32,
    pub source_urls: Vec<String>,
}

/// A stored facet recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedFacet {
    pub id: String,
    pub job_id: String,
    pub category_id: String,
    pub facet_name: String,
    pub possible_values: String,
    pub filling_percentage: f64,
    pub priority: Priority,
    pub confidence_score: u8,
    pub num_sources: u32,
    pub source_urls: Vec<String>,
    pub sort_order: u32,
}

fn precedence(a: &FacetDraft, b: &FacetDraft) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| b.confidence_score.cmp(&a.confidence_score))
        .then_with(|| b.filling_percentage.total_cmp(&a.filling_percentage))
}

/// Orders drafts by priority, then confidence and filling descending, and
/// numbers them `1..=n` for `job_id`.
pub fn rank(job_id: &str, mut drafts: Vec<FacetDraft>) -> Vec<RecommendedFacet> {
    drafts.sort_by(precedence);
    drafts
        .into_iter()
        .zip(1u32..)
        .map(|(d, sort_order)| RecommendedFacet {
            id: uuid::Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            category_id: d.category_id,
            facet_name: d.facet_name,
            possible_values: d.possible_values,
            filling_percentage: d.filling_percentage,
            priority: d.priority,
            confidence_score: d.confidence_score,
            num_sources: d.num_sources,
            source_urls: d.source_urls,
            sort_order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft(priority: Priority, confidence: u8, filling: f64) -> FacetDraft {
        FacetDraft {
            category_id: "cat".to_string(),
            facet_name: format!("{}-{}-{}", priority, confidence, filling),
            possible_values: String::new(),
            filling_percentage: filling,
            priority,
            confidence_score: confidence,
            num_sources: 0,
            source_urls: Vec::new(),
        }
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse_lenient("HIGH"), Priority::High);
        assert_eq!(Priority::parse_lenient(" low "), Priority::Low);
        assert_eq!(Priority::parse_lenient("urgent"), Priority::Medium);
        assert!(Priority::High < Priority::Medium && Priority::Medium < Priority::Low);
    }

    #[test]
    fn test_rank_precedence() {
        let ranked = rank(
            "j1",
            vec![
                draft(Priority::Low, 10, 100.0),
                draft(Priority::High, 5, 10.0),
                draft(Priority::High, 9, 10.0),
                draft(Priority::High, 9, 80.0),
                draft(Priority::Medium, 1, 0.0),
            ],
        );
        let order: Vec<_> = ranked
            .iter()
            .map(|f| (f.priority, f.confidence_score, f.filling_percentage as u32))
            .collect();
        assert_eq!(
            order,
            vec![
                (Priority::High, 9, 80),
                (Priority::High, 9, 10),
                (Priority::High, 5, 10),
                (Priority::Medium, 1, 0),
                (Priority::Low, 10, 100),
            ]
        );
        assert_eq!(
            ranked.iter().map(|f| f.sort_order).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    fn arb_priority() -> impl Strategy<Value = Priority> {
        prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
    }

    proptest! {
        #[test]
        fn prop_sort_order_is_contiguous_and_respects_precedence(
            specs in proptest::collection::vec((arb_priority(), 1u8..=10, 0u32..=100), 0..30)
        ) {
            let drafts: Vec<_> = specs
                .iter()
                .map(|(p, c, f)| draft(*p, *c, *f as f64))
                .collect();
            let ranked = rank("j", drafts);

            for (i, facet) in ranked.iter().enumerate() {
                prop_assert_eq!(facet.sort_order as usize, i + 1);
            }
            for pair in ranked.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                let key = |f: &RecommendedFacet| {
                    (f.priority, std::cmp::Reverse(f.confidence_score), std::cmp::Reverse(f.filling_percentage as u32))
                };
                prop_assert!(key(a) <= key(b));
            }
        }
    }
}
