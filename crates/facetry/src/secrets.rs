//! Resolution of the backend access key.
//!
//! A key can be configured three ways, checked in this order:
//!
//! 1. inline in the config file (`anon_key`), handy for local testing
//! 2. a file holding the key (`anon_key_file`), e.g. a mounted secret
//! 3. the name of an environment variable (`anon_key_env`)
//!
//! Empty strings count as "not configured".

use secrecy::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No key source configured (set one of: inline value, file path, env var name)")]
    NoSourceProvided,

    #[error("Failed to read key from file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// The configured places a secret may come from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub direct: Option<&'a str>,
    pub file: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl<'a> SecretSource<'a> {
    pub fn is_configured(&self) -> bool {
        non_empty(self.direct).is_some()
            || non_empty(self.file).is_some()
            || non_empty(self.env_var).is_some()
    }

    /// Returns the first configured source's value, trimmed.
    pub fn resolve(&self) -> Result<SecretString, SecretError> {
        if let Some(value) = non_empty(self.direct) {
            return Ok(SecretString::from(value.to_string()));
        }

        if let Some(path) = non_empty(self.file) {
            let expanded = expand_home(path);
            let content = std::fs::read_to_string(&expanded).map_err(|source| {
                SecretError::FileRead {
                    path: expanded.clone(),
                    source,
                }
            })?;
            return Ok(SecretString::from(content.trim().to_string()));
        }

        if let Some(name) = non_empty(self.env_var) {
            return match std::env::var(name) {
                Ok(value) => Ok(SecretString::from(value.trim().to_string())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: name.to_string(),
                }),
            };
        }

        Err(SecretError::NoSourceProvided)
    }

    /// Like [`SecretSource::resolve`], but an unconfigured source is `None`.
    pub fn resolve_optional(&self) -> Result<Option<SecretString>, SecretError> {
        match self.resolve() {
            Ok(secret) => Ok(Some(secret)),
            Err(SecretError::NoSourceProvided) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Expands a leading `~` or `~/`. `~user` forms are left alone.
fn expand_home(path: &str) -> String {
    if path != "~" && !path.starts_with("~/") {
        return path.to_string();
    }
    match dirs::home_dir() {
        Some(home) => path.replacen('~', &home.to_string_lossy(), 1),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source<'a>(
        direct: Option<&'a str>,
        file: Option<&'a str>,
        env_var: Option<&'a str>,
    ) -> SecretSource<'a> {
        SecretSource {
            direct,
            file,
            env_var,
        }
    }

    #[test]
    #[serial]
    fn test_inline_value_wins() {
        std::env::set_var("FACETRY_TEST_KEY_1", "from-env");
        let key = source(Some("inline"), None, Some("FACETRY_TEST_KEY_1"))
            .resolve()
            .unwrap();
        assert_eq!(key.expose_secret(), "inline");
        std::env::remove_var("FACETRY_TEST_KEY_1");
    }

    #[test]
    #[serial]
    fn test_file_beats_env_and_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();
        std::env::set_var("FACETRY_TEST_KEY_2", "from-env");

        let path = file.path().to_str().unwrap();
        let key = source(None, Some(path), Some("FACETRY_TEST_KEY_2"))
            .resolve()
            .unwrap();
        assert_eq!(key.expose_secret(), "from-file");
        std::env::remove_var("FACETRY_TEST_KEY_2");
    }

    #[test]
    #[serial]
    fn test_empty_values_fall_through_to_env() {
        std::env::set_var("FACETRY_TEST_KEY_3", "from-env\n");
        let key = source(Some(""), Some(""), Some("FACETRY_TEST_KEY_3"))
            .resolve()
            .unwrap();
        assert_eq!(key.expose_secret(), "from-env");
        std::env::remove_var("FACETRY_TEST_KEY_3");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            SecretSource::default().resolve(),
            Err(SecretError::NoSourceProvided)
        ));
        assert!(matches!(
            source(None, Some("/nonexistent/facetry/key"), None).resolve(),
            Err(SecretError::FileRead { .. })
        ));
        assert!(matches!(
            source(None, None, Some("FACETRY_DEFINITELY_UNSET_98765")).resolve(),
            Err(SecretError::EnvVarNotSet { .. })
        ));
    }

    #[test]
    fn test_optional_and_configured() {
        assert!(SecretSource::default().resolve_optional().unwrap().is_none());
        assert!(!source(Some(""), None, Some("")).is_configured());
        assert!(source(None, Some("/x"), None).is_configured());
    }

    #[test]
    fn test_expand_home_leaves_other_paths() {
        assert_eq!(expand_home("/etc/key"), "/etc/key");
        assert_eq!(expand_home("~alice/key"), "~alice/key");
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy().into_owned();
            assert_eq!(expand_home("~/key"), format!("{}/key", home));
        }
    }
}
