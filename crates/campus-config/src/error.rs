//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while resolving environment and settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required base-URL environment variable is unset or empty.
    #[error("required environment variable '{name}' is not set")]
    MissingEnvVar { name: String },

    /// A base-URL environment variable does not hold an absolute URL.
    #[error("environment variable '{name}' is not a valid URL: '{value}'")]
    InvalidUrl { name: String, value: String },

    /// Unknown deployment environment name.
    #[error(
        "unknown environment '{0}' (expected production, dev, local or local-production)"
    )]
    UnknownEnvironment(String),

    /// Failed to read the settings file.
    #[error("failed to read settings file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}
