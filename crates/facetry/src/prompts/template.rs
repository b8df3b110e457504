use serde::{Deserialize, Serialize};

pub const INDUSTRY_ANALYSIS: &str = "Industry Analysis";
pub const MASTER_PROMPT: &str = "Master Prompt";

/// A reusable generation instruction shared by every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub template: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub is_active: bool,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            level: 0,
            template: template.into(),
            metadata: serde_json::Value::Object(Default::default()),
            is_active: true,
        }
    }
}

/// A client's replacement text for one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOverride {
    pub id: String,
    pub client_id: String,
    pub prompt_template_id: String,
    pub template_content: String,
    pub version: u32,
    pub is_active: bool,
}

/// A template with the content a given client should actually send.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrompt {
    pub template: PromptTemplate,
    pub content: String,
    /// Version of the override in effect, if any.
    pub override_version: Option<u32>,
}

impl ResolvedPrompt {
    pub fn resolve(template: PromptTemplate, active_override: Option<&PromptOverride>) -> Self {
        match active_override.filter(|o| o.is_active) {
            Some(o) => Self {
                content: o.template_content.clone(),
                override_version: Some(o.version),
                template,
            },
            None => Self {
                content: template.template.clone(),
                override_version: None,
                template,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.template.id
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }
}
