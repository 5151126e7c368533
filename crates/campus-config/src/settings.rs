//! User settings discovery and loading.
//!
//! Settings live in `config.toml` inside the config directory:
//!
//! ```toml
//! environment = "local-production"
//! timeout_ms = 100000
//! single_flight_refresh = false
//! ```
//!
//! A missing file yields [`Settings::default`]. CLI arguments override
//! individual fields afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Environment, Result};

/// Default request timeout for the main client.
pub const DEFAULT_TIMEOUT_MS: u64 = 100_000;

/// Settings filename within the config directory.
const SETTINGS_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "campus";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "CAMPUS_CONFIG_DIR";

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which base URL the client talks to.
    pub environment: Environment,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Collapse concurrent token refreshes into one refresh call.
    pub single_flight_refresh: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            single_flight_refresh: false,
        }
    }
}

impl Settings {
    /// Parse settings from TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Load settings from `config.toml` in `dir`, or in [`config_dir`] when `None`.
///
/// A missing file (or an undeterminable config directory) yields defaults.
pub fn load_settings(dir: Option<&Path>) -> Result<Settings> {
    let path = match dir {
        Some(dir) => dir.join(SETTINGS_FILE),
        None => match settings_path() {
            Some(path) => path,
            None => return Ok(Settings::default()),
        },
    };

    if !path.is_file() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Settings::from_toml(&contents)
}

/// Path of the user settings file.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(SETTINGS_FILE))
}

/// Config directory for campus.
///
/// Checks `CAMPUS_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/campus` on Linux, `~/Library/Application Support/campus` on macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(Some(dir.path())).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.timeout_ms, 100_000);
        assert_eq!(settings.environment, Environment::LocalProduction);
        assert!(!settings.single_flight_refresh);
    }

    #[test]
    fn test_load_settings_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r#"
environment = "dev"
single_flight_refresh = true
"#,
        )
        .unwrap();

        let settings = load_settings(Some(dir.path())).unwrap();
        assert_eq!(settings.environment, Environment::Dev);
        assert!(settings.single_flight_refresh);
        // Unspecified fields keep their defaults
        assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "environment = [").unwrap();

        let err = load_settings(Some(dir.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let err = Settings::from_toml(r#"environment = "staging""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_settings_path_shape() {
        if let Some(p) = settings_path() {
            assert!(p.ends_with("config.toml"));
        }
    }
}
