//! Configuration for the Campus admin client.
//!
//! Provides:
//! - Base URL resolution from four required environment variables, one per
//!   deployment environment (fails fast when any is missing)
//! - Deployment environment selection (`local-production` by default)
//! - Optional user settings (`config.toml`) with request timeout and refresh policy
//! - Config directory discovery (`CAMPUS_CONFIG_DIR` or the platform default)

pub mod env;
pub mod error;
pub mod settings;

pub use env::{BaseUrls, Environment, strip_trailing_slashes};
pub use error::{ConfigError, Result};
pub use settings::{DEFAULT_TIMEOUT_MS, Settings, config_dir, load_settings, settings_path};
