//! Wire types for the hosted functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{path, Category};
use crate::prompts::ResolvedPrompt;

/// A category as the generator sees it, cut down to the navigated depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextCategory {
    pub id: String,
    pub category_path: String,
    pub level: u32,
    pub name: String,
}

impl ContextCategory {
    /// Projects `category` to at most `depth` segments. Depth 0 keeps the
    /// full path.
    pub fn project(category: &Category, depth: usize) -> Self {
        if depth == 0 || depth >= category.level as usize {
            return Self {
                id: category.id.clone(),
                category_path: category.category_path.clone(),
                level: category.level,
                name: category.name.clone(),
            };
        }
        let truncated = path::truncate(&category.category_path, depth);
        let name = path::segments(&truncated)
            .last()
            .map(|s| s.to_string())
            .unwrap_or_default();
        Self {
            id: category.id.clone(),
            category_path: truncated,
            level: depth as u32,
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub id: String,
    pub name: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub context_categories: Vec<ContextCategory>,
}

impl PromptPayload {
    pub fn new(prompt: &ResolvedPrompt, context_categories: Vec<ContextCategory>) -> Self {
        Self {
            id: prompt.template.id.clone(),
            name: prompt.template.name.clone(),
            content: prompt.content.clone(),
            metadata: prompt.template.metadata.clone(),
            context_categories,
        }
    }
}

/// Body of `generate-facets-ai`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub job_id: String,
    pub category_ids: Vec<String>,
    pub prompts: Vec<PromptPayload>,
}

/// Reply of `generate-facets-ai`.
///
/// The hosted function writes its rows itself and only reports a count.
/// Generators that run locally hand the rows back in `facets` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub facets_generated: u64,
    #[serde(default)]
    pub facets: Vec<serde_json::Value>,
}

/// Body of `analyze-level{1,2,3}`: the project plus one name per level,
/// keyed `level1`, `level2`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub project_id: String,
    #[serde(flatten)]
    pub names: BTreeMap<String, String>,
}

impl AnalyzeRequest {
    pub fn new<S: AsRef<str>>(project_id: impl Into<String>, names: &[S]) -> Self {
        Self {
            project_id: project_id.into(),
            names: names
                .iter()
                .enumerate()
                .map(|(i, n)| (format!("level{}", i + 1), n.as_ref().to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Body of `invite-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: String,
    pub client_id: String,
    pub full_name: String,
}
