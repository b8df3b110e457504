use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::export::COLUMN_COUNT;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub const BASE_URL_ENV: &str = "FACETRY_BASE_URL";
pub const ANON_KEY_ENV: &str = "FACETRY_ANON_KEY";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads `path` when given, else the built-in defaults, then applies the
/// process environment on top.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => load_config(p)?,
        None => Config::default(),
    };
    Ok(apply_env_overrides(config, |name| std::env::var(name).ok()))
}

/// Applies `FACETRY_BASE_URL` and `FACETRY_ANON_KEY`. An env key replaces
/// whatever key source the file configured.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.backend.base_url = url.trim().to_string();
    }
    if let Some(key) = lookup(ANON_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        config.backend.anon_key = Some(key.trim().to_string());
    }
    config
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(invalid(format!(
            "Unsupported config version: {}",
            config.version
        )));
    }

    let url = config.backend.base_url.trim();
    if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(invalid(format!(
            "backend.base_url must be an http(s) URL, got '{}'",
            url
        )));
    }

    if config.export.columns.len() > COLUMN_COUNT {
        return Err(invalid(format!(
            "export.columns has {} entries, at most {} are used",
            config.export.columns.len(),
            COLUMN_COUNT
        )));
    }

    if config.prompts.required.iter().all(|name| name.trim().is_empty()) {
        return Err(invalid("prompts.required must name at least one prompt"));
    }

    if config.dedup.lookback == 0 {
        return Err(invalid("dedup.lookback must be at least 1"));
    }

    if config.navigator.search_limit == 0 {
        return Err(invalid("navigator.search_limit must be at least 1"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = load_config_from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.queue.debounce(), Duration::from_millis(500));
        assert_eq!(config.navigator.search_limit, 50);
        assert_eq!(config.navigator.auto_reset_after(), Duration::from_secs(3));
        assert_eq!(config.dedup.lookback, 20);
        assert_eq!(config.prompts.required, vec!["Industry Analysis", "Master Prompt"]);
        assert_eq!(config.export.columns.len(), 9);
        assert_eq!(
            config.backend.anon_key_env.as_deref(),
            Some("FACETRY_ANON_KEY")
        );
    }

    #[test]
    fn test_full_config() {
        let config = load_config_from_str(
            r#"
            {
                "version": "1.0",
                "backend": {
                    "base_url": "https://project.example.co",
                    "anon_key_file": "/run/secrets/anon",
                    "timeout_secs": 30
                },
                "database_path": "/tmp/facetry.db",
                "queue": {"debounce_ms": 250},
                "dedup": {"lookback": 5},
                "prompts": {"required": ["Master Prompt"], "execution_order": ["A", "B"]}
            }
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "https://project.example.co");
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.queue.debounce_ms, 250);
        assert_eq!(config.dedup.lookback, 5);
        assert_eq!(config.prompts.execution_order, vec!["A", "B"]);
        assert!(config.backend.key_source().is_configured());
    }

    #[test]
    fn test_invalid_version() {
        let err = load_config_from_str(r#"{"version": "2.0"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_schema_rejects_unknown_keys_and_bad_types() {
        let err = load_config_from_str(r#"{"version": "1.0", "colour": "blue"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));

        let err =
            load_config_from_str(r#"{"version": "1.0", "dedup": {"lookback": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));

        let err = load_config_from_str(r#"{"version": "1.0", "prompts": {"required": []}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = load_config_from_str(r#"{"version": "1.0", "backend": {"base_url": "ftp://x"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/facetry.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facetry.json");
        std::fs::write(&path, r#"{"version": "1.0", "navigator": {"search_limit": 10}}"#).unwrap();
        assert_eq!(load_config(&path).unwrap().navigator.search_limit, 10);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (BASE_URL_ENV, " https://override.example.co "),
            (ANON_KEY_ENV, "env-key"),
        ]
        .into_iter()
        .collect();
        let config = apply_env_overrides(Config::default(), |name| {
            env.get(name).map(|v| v.to_string())
        });
        assert_eq!(config.backend.base_url, "https://override.example.co");
        assert_eq!(config.backend.anon_key.as_deref(), Some("env-key"));

        let untouched = apply_env_overrides(Config::default(), |_| None);
        assert!(untouched.backend.base_url.is_empty());
        assert!(untouched.backend.anon_key.is_none());
    }
}
