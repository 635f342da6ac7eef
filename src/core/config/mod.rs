//! core::config
//!
//! Configuration: credentials from the environment and an optional
//! settings file.
//!
//! # Settings File Locations
//!
//! Searched in order, first hit wins:
//! 1. `--config <path>` (must exist)
//! 2. `$GBIF_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/gbif/config.toml`
//! 4. `~/.gbif/config.toml`
//!
//! No file means defaults.
//!
//! # Example
//!
//! ```no_run
//! use gbif_occ::core::config::Settings;
//!
//! let loaded = Settings::load(None).unwrap();
//! println!("API base: {}", loaded.settings.api_base());
//! ```

mod credentials;
pub mod schema;

pub use credentials::{Credentials, GBIF_EMAIL, GBIF_PWD, GBIF_USER};
pub use schema::Settings;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable pointing at a settings file.
pub const GBIF_CONFIG: &str = "GBIF_CONFIG";

/// Errors from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{0} not supplied and no entry in environment variables; \
         define GBIF_USER, GBIF_PWD and GBIF_EMAIL first"
    )]
    MissingCredential(&'static str),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Settings plus the file they came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// `None` when defaults are in use.
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the process environment and default locations.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
        Self::load_with(explicit, |name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// Load settings with an explicit environment lookup and home directory.
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<LoadedSettings, ConfigError> {
        let path = match explicit {
            // An explicit path that does not exist is an error, not a fallback
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(&env, home),
        };

        let Some(path) = path else {
            return Ok(LoadedSettings::default());
        };

        let settings = Self::read(&path)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(LoadedSettings {
            settings,
            path: Some(path),
        })
    }

    /// First existing file among the implicit locations.
    fn discover(env: &impl Fn(&str) -> Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
        let candidates = [
            env(GBIF_CONFIG).map(PathBuf::from),
            env("XDG_CONFIG_HOME").map(|xdg| PathBuf::from(xdg).join("gbif/config.toml")),
            home.map(|h| h.join(".gbif/config.toml")),
        ];
        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Read and parse a settings file.
    fn read(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn no_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Settings::load_with(None, no_env, Some(dir.path().to_path_buf())).unwrap();
        assert!(loaded.path.is_none());
        assert_eq!(loaded.settings, Settings::default());
    }

    #[test]
    fn home_file_is_found() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".gbif")).unwrap();
        fs::write(dir.path().join(".gbif/config.toml"), "pretty = true\n").unwrap();

        let loaded = Settings::load_with(None, no_env, Some(dir.path().to_path_buf())).unwrap();
        assert!(loaded.settings.pretty());
        assert_eq!(loaded.path, Some(dir.path().join(".gbif/config.toml")));
    }

    #[test]
    fn gbif_config_wins_over_home() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".gbif")).unwrap();
        fs::write(dir.path().join(".gbif/config.toml"), "pretty = true\n").unwrap();
        let custom = dir.path().join("custom.toml");
        fs::write(&custom, "sort_keys = true\n").unwrap();

        let custom_str = custom.to_string_lossy().to_string();
        let env = move |name: &str| (name == GBIF_CONFIG).then(|| custom_str.clone());
        let loaded = Settings::load_with(None, env, Some(dir.path().to_path_buf())).unwrap();

        assert!(loaded.settings.sort_keys());
        assert!(!loaded.settings.pretty());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Settings::load_with(Some(&missing), no_env, None).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "pretty = [").unwrap();
        let err = Settings::load_with(Some(&path), no_env, None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "timeout_secs = 0\n").unwrap();
        let err = Settings::load_with(Some(&path), no_env, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn missing_credential_message_is_one_line() {
        let msg = ConfigError::MissingCredential(GBIF_EMAIL).to_string();
        assert!(msg.starts_with("GBIF_EMAIL not supplied"));
        assert!(!msg.contains('\n'));
    }
}
