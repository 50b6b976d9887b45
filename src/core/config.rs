//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::core::errors::{Result, TranslationError};

/// Yandex.Translate API v1.5 JSON endpoint
pub const DEFAULT_BASE_URL: &str = "https://translate.yandex.net/api/v1.5/tr.json/";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "YANDEX_API_KEY";

/// Environment variable overriding the base URL
pub const API_ENDPOINT_ENV: &str = "YANDEX_API_ENDPOINT";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_MS";

const DEFAULT_TIMEOUT_MS: u64 = 30000;

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Yandex.Translate API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL the `translate` path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout of the default HTTP client
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TranslatorConfig {
    /// Create a configuration for the default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                TranslationError::config(format!(
                    "missing required environment variable {}",
                    API_KEY_ENV
                ))
            })?;

        let base_url = lookup(API_ENDPOINT_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_base_url);

        let timeout_ms = match lookup(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                TranslationError::config(format!("{} must be an integer: {}", TIMEOUT_ENV, e))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let config = Self {
            api_key,
            base_url,
            timeout_ms,
        };
        config.validate()?;

        info!("Loaded configuration for {}", config.base_url);
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(TranslationError::config("API key is required"));
        }

        if self.base_url.trim().is_empty() {
            return Err(TranslationError::config("API endpoint is required"));
        }

        if self.timeout_ms == 0 {
            return Err(TranslationError::config("timeout_ms must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = TranslatorConfig::from_lookup(lookup(&[(API_KEY_ENV, "test_key")])).unwrap();

        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 30000);
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = TranslatorConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "test_key"),
            (API_ENDPOINT_ENV, "http://127.0.0.1:8080/api/"),
            (TIMEOUT_ENV, "500"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/");
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn test_config_missing_key() {
        let err = TranslatorConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
        assert!(err.to_string().contains(API_KEY_ENV));

        let err = TranslatorConfig::from_lookup(lookup(&[(API_KEY_ENV, "")])).unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[test]
    fn test_config_bad_timeout() {
        let err = TranslatorConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "test_key"),
            (TIMEOUT_ENV, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_ENV));

        let err = TranslatorConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "test_key"),
            (TIMEOUT_ENV, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TranslationError::ConfigError { .. }));
    }

    #[test]
    fn test_config_validation() {
        assert!(TranslatorConfig::new("test_key").validate().is_ok());
        assert!(TranslatorConfig::default().validate().is_err());
        assert!(TranslatorConfig::new("test_key")
            .with_base_url("")
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translate.json");

        let config = TranslatorConfig::new("file_key").with_timeout_ms(1500);
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translate.json");
        std::fs::write(&path, r#"{"api_key":"file_key"}"#).unwrap();

        let loaded = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
        assert_eq!(loaded.timeout_ms, 30000);
    }

    #[test]
    fn test_config_file_missing() {
        let err = TranslatorConfig::from_file("/nonexistent/translate.json").unwrap_err();
        assert!(matches!(err, TranslationError::IoError(_)));
    }
}
