//! Offline generator returning canned facets.
//!
//! Stands in for the hosted function when no backend is configured. The
//! rows are keyword-matched against each category's name and path.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::FacetGenerator;
use super::error::GenerationError;
use super::payload::{ContextCategory, GenerateRequest, GenerateResponse};

struct SampleFacet {
    name: &'static str,
    values: &'static [&'static str],
    filling: f64,
    priority: &'static str,
    confidence: u8,
}

struct SampleSet {
    keywords: &'static [&'static str],
    facets: &'static [SampleFacet],
}

const GENERIC: &[SampleFacet] = &[
    SampleFacet {
        name: "Brand",
        values: &["Brand A", "Brand B", "Brand C"],
        filling: 96.0,
        priority: "High",
        confidence: 9,
    },
    SampleFacet {
        name: "Price Range",
        values: &["Under $25", "$25 - $100", "Over $100"],
        filling: 100.0,
        priority: "High",
        confidence: 8,
    },
    SampleFacet {
        name: "Color",
        values: &["Black", "White", "Red", "Blue"],
        filling: 78.0,
        priority: "Medium",
        confidence: 7,
    },
    SampleFacet {
        name: "Material",
        values: &["Plastic", "Metal", "Fabric"],
        filling: 55.0,
        priority: "Low",
        confidence: 5,
    },
];

const SETS: &[SampleSet] = &[
    SampleSet {
        keywords: &["jacket", "apparel", "clothing", "vest", "shirt"],
        facets: &[
            SampleFacet {
                name: "Size",
                values: &["XS", "S", "M", "L", "XL"],
                filling: 92.0,
                priority: "High",
                confidence: 9,
            },
            SampleFacet {
                name: "Fit",
                values: &["Regular", "Slim", "Relaxed"],
                filling: 61.0,
                priority: "Medium",
                confidence: 6,
            },
        ],
    },
    SampleSet {
        keywords: &["electronic", "gps", "radio", "sonar"],
        facets: &[
            SampleFacet {
                name: "Screen Size",
                values: &["Under 5\"", "5\" - 9\"", "Over 9\""],
                filling: 70.0,
                priority: "High",
                confidence: 8,
            },
            SampleFacet {
                name: "Connectivity",
                values: &["Bluetooth", "Wi-Fi", "NMEA 2000"],
                filling: 64.0,
                priority: "Medium",
                confidence: 7,
            },
        ],
    },
    SampleSet {
        keywords: &["marine", "boat", "safety"],
        facets: &[SampleFacet {
            name: "Certification",
            values: &["USCG Approved", "ISO 12402", "None"],
            filling: 48.0,
            priority: "High",
            confidence: 7,
        }],
    },
];

fn sample_rows(category_id: &str, context: Option<&ContextCategory>) -> Vec<Value> {
    let haystack = context
        .map(|c| c.category_path.to_lowercase())
        .unwrap_or_default();
    let matched = SETS
        .iter()
        .filter(|set| set.keywords.iter().any(|k| haystack.contains(k)))
        .flat_map(|set| set.facets.iter());

    matched
        .chain(GENERIC.iter())
        .map(|f| {
            json!({
                "category_id": category_id,
                "facet_name": f.name,
                "possible_values": f.values,
                "filling_percentage": f.filling,
                "priority": f.priority,
                "confidence_score": f.confidence,
                "num_sources": 0,
                "source_urls": [],
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleFacetGenerator;

#[async_trait]
impl FacetGenerator for SampleFacetGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        let contexts: Vec<&ContextCategory> = request
            .prompts
            .iter()
            .flat_map(|p| p.context_categories.iter())
            .collect();

        let facets: Vec<Value> = request
            .category_ids
            .iter()
            .flat_map(|id| {
                let context = contexts.iter().copied().find(|c| &c.id == id);
                sample_rows(id, context)
            })
            .collect();

        tracing::debug!(job_id = %request.job_id, count = facets.len(), "Sample facets produced");
        Ok(GenerateResponse {
            facets_generated: facets.len() as u64,
            facets,
        })
    }
}
