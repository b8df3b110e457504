use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::export::DEFAULT_COLUMNS;
use crate::prompts::{DEFAULT_EXECUTION_ORDER, DEFAULT_REQUIRED};
use crate::secrets::SecretSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub backend: BackendConfig,
    /// SQLite file; `~/.facetry/data/facetry.db` when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub navigator: NavigatorConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            backend: BackendConfig::default(),
            database_path: None,
            queue: QueueConfig::default(),
            navigator: NavigatorConfig::default(),
            dedup: DedupConfig::default(),
            prompts: PromptsConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Hosted functions endpoint and its anonymous access key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub anon_key_file: Option<String>,
    #[serde(default = "default_anon_key_env")]
    pub anon_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_anon_key_env() -> Option<String> {
    Some("FACETRY_ANON_KEY".to_string())
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            anon_key: None,
            anon_key_file: None,
            anon_key_env: default_anon_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn key_source(&self) -> SecretSource<'_> {
        SecretSource {
            direct: self.anon_key.as_deref(),
            file: self.anon_key_file.as_deref(),
            env_var: self.anon_key_env.as_deref(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl QueueConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_auto_reset_ms")]
    pub auto_reset_ms: u64,
}

fn default_search_limit() -> usize {
    50
}

fn default_auto_reset_ms() -> u64 {
    3000
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            auto_reset_ms: default_auto_reset_ms(),
        }
    }
}

impl NavigatorConfig {
    pub fn auto_reset_after(&self) -> Duration {
        Duration::from_millis(self.auto_reset_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// How many recent completed jobs are checked for a duplicate.
    #[serde(default = "default_lookback")]
    pub lookback: u32,
}

fn default_lookback() -> u32 {
    20
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// At least one of these must be selected to generate.
    #[serde(default = "default_required")]
    pub required: Vec<String>,
    #[serde(default = "default_execution_order")]
    pub execution_order: Vec<String>,
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_required() -> Vec<String> {
    to_strings(DEFAULT_REQUIRED)
}

fn default_execution_order() -> Vec<String> {
    to_strings(DEFAULT_EXECUTION_ORDER)
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            required: default_required(),
            execution_order: default_execution_order(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Header names used when a job does not carry its own.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

fn default_columns() -> Vec<String> {
    to_strings(&DEFAULT_COLUMNS)
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}
