//! core::config::schema
//!
//! Settings file schema.
//!
//! # Example
//!
//! ```toml
//! api_base = "https://api.gbif-uat.org/v1"
//! timeout_secs = 30
//! pretty = true
//! sort_keys = false
//! ```
//!
//! Credentials are deliberately absent: they come only from the
//! environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::backend::http::{DEFAULT_API_BASE, DEFAULT_TIMEOUT};

/// User settings. Every field is optional; accessors apply defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// GBIF API base URL
    pub api_base: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Pretty-print JSON output by default
    pub pretty: Option<bool>,

    /// Sort object keys in JSON output by default
    pub sort_keys: Option<bool>,
}

impl Settings {
    /// API base URL, defaulting to the public GBIF API.
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Request timeout, defaulting to 60 seconds.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn pretty(&self) -> bool {
        self.pretty.unwrap_or(false)
    }

    pub fn sort_keys(&self) -> bool {
        self.sort_keys.unwrap_or(false)
    }

    /// Validate values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref base) = self.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base(), "https://api.gbif.org/v1");
        assert_eq!(settings.timeout(), Duration::from_secs(60));
        assert!(!settings.pretty());
        assert!(!settings.sort_keys());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn parse_full_file() {
        let settings: Settings = toml::from_str(
            r#"
            api_base = "https://api.gbif-uat.org/v1"
            timeout_secs = 5
            pretty = true
            sort_keys = true
            "#,
        )
        .unwrap();
        assert_eq!(settings.api_base(), "https://api.gbif-uat.org/v1");
        assert_eq!(settings.timeout(), Duration::from_secs(5));
        assert!(settings.pretty());
        assert!(settings.sort_keys());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Settings, _> = toml::from_str("password = \"hunter2\"");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_non_http_base() {
        let settings = Settings {
            api_base: Some("ftp://example.org".into()),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let settings = Settings {
            timeout_secs: Some(0),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
