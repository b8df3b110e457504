//! Builders for test data.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use facetry::config::Config;
use facetry::generation::{GenerateRequest, GenerateResponse};
use facetry::{FacetGenerator, GenerationError};

/// Builder for `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.config.backend.base_url = url.to_string();
        self
    }

    pub fn lookback(mut self, lookback: u32) -> Self {
        self.config.dedup.lookback = lookback;
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.config.prompts.required = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.config.export.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one raw generator row, keyed the canonical way.
pub struct FacetRowBuilder {
    row: serde_json::Map<String, Value>,
}

impl FacetRowBuilder {
    pub fn new(category_id: &str, facet_name: &str) -> Self {
        let mut row = serde_json::Map::new();
        row.insert("category_id".into(), json!(category_id));
        row.insert("facet_name".into(), json!(facet_name));
        Self { row }
    }

    pub fn priority(mut self, priority: &str) -> Self {
        self.row.insert("priority".into(), json!(priority));
        self
    }

    pub fn confidence(mut self, score: u8) -> Self {
        self.row.insert("confidence_score".into(), json!(score));
        self
    }

    pub fn filling(mut self, pct: f64) -> Self {
        self.row.insert("filling_percentage".into(), json!(pct));
        self
    }

    pub fn values(mut self, values: &str) -> Self {
        self.row.insert("possible_values".into(), json!(values));
        self
    }

    /// Stores a field under an arbitrary key, e.g. a lettered header.
    pub fn raw(mut self, key: &str, value: Value) -> Self {
        self.row.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.row)
    }
}

/// Generator that answers every call with the same rows and records the
/// requests it saw.
pub struct FixedGenerator {
    rows: Vec<Value>,
    reported: Option<u64>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl FixedGenerator {
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            reported: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reports `count` generated facets regardless of the rows returned.
    pub fn reporting(mut self, count: u64) -> Self {
        self.reported = Some(count);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl FacetGenerator for FixedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(GenerateResponse {
            facets_generated: self.reported.unwrap_or(self.rows.len() as u64),
            facets: self.rows.clone(),
        })
    }
}
