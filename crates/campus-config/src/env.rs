//! Base URL resolution from the process environment.
//!
//! Every deployment environment has its own base URL variable and all four
//! must be present at startup, even though only one is used at a time:
//!
//! | environment        | variable                           |
//! |--------------------|------------------------------------|
//! | `production`       | `CAMPUS_API_URL_PRODUCTION`        |
//! | `dev`              | `CAMPUS_API_URL_DEV`               |
//! | `local`            | `CAMPUS_API_URL_LOCAL`             |
//! | `local-production` | `CAMPUS_API_URL_LOCAL_PRODUCTION`  |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Deployment environment a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    Production,
    Dev,
    Local,
    #[default]
    LocalProduction,
}

impl Environment {
    /// All environments, in declaration order.
    pub const ALL: [Environment; 4] = [
        Environment::Production,
        Environment::Dev,
        Environment::Local,
        Environment::LocalProduction,
    ];

    /// Name of the environment variable holding this environment's base URL.
    pub fn env_var(&self) -> &'static str {
        match self {
            Environment::Production => "CAMPUS_API_URL_PRODUCTION",
            Environment::Dev => "CAMPUS_API_URL_DEV",
            Environment::Local => "CAMPUS_API_URL_LOCAL",
            Environment::LocalProduction => "CAMPUS_API_URL_LOCAL_PRODUCTION",
        }
    }

    /// Canonical kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Dev => "dev",
            Environment::Local => "local",
            Environment::LocalProduction => "local-production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "dev" | "development" => Ok(Environment::Dev),
            "local" => Ok(Environment::Local),
            "local-production" | "local_production" => Ok(Environment::LocalProduction),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// The four resolved base URLs, trailing slashes stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    pub production: String,
    pub dev: String,
    pub local: String,
    pub local_production: String,
}

impl BaseUrls {
    /// Resolve all base URLs from the process environment.
    ///
    /// Fails on the first variable that is unset, empty or not an absolute URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve all base URLs through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |env: Environment| -> Result<String> {
            let name = env.env_var();
            let value = match lookup(name) {
                Some(value) if !value.trim().is_empty() => value,
                _ => {
                    return Err(ConfigError::MissingEnvVar {
                        name: name.to_string(),
                    });
                }
            };

            let url = strip_trailing_slashes(value.trim());
            if url::Url::parse(url).is_err() {
                return Err(ConfigError::InvalidUrl {
                    name: name.to_string(),
                    value,
                });
            }
            Ok(url.to_string())
        };

        Ok(Self {
            production: resolve(Environment::Production)?,
            dev: resolve(Environment::Dev)?,
            local: resolve(Environment::Local)?,
            local_production: resolve(Environment::LocalProduction)?,
        })
    }

    /// Base URL for the given environment.
    pub fn get(&self, env: Environment) -> &str {
        match env {
            Environment::Production => &self.production,
            Environment::Dev => &self.dev,
            Environment::Local => &self.local,
            Environment::LocalProduction => &self.local_production,
        }
    }
}

/// Remove every trailing `/` from a URL.
pub fn strip_trailing_slashes(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("CAMPUS_API_URL_PRODUCTION", "https://api.campus.example"),
            ("CAMPUS_API_URL_DEV", "https://dev.campus.example/"),
            ("CAMPUS_API_URL_LOCAL", "http://localhost:5000//"),
            ("CAMPUS_API_URL_LOCAL_PRODUCTION", "http://localhost:5001/api/"),
        ])
    }

    #[test]
    fn test_resolves_all_and_strips_slashes() {
        let vars = full_env();
        let urls = BaseUrls::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(urls.production, "https://api.campus.example");
        assert_eq!(urls.dev, "https://dev.campus.example");
        assert_eq!(urls.local, "http://localhost:5000");
        assert_eq!(
            urls.get(Environment::LocalProduction),
            "http://localhost:5001/api"
        );
    }

    #[test]
    fn test_any_missing_variable_fails() {
        for missing in Environment::ALL {
            let mut vars = full_env();
            vars.remove(missing.env_var());

            let err = BaseUrls::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
            match err {
                ConfigError::MissingEnvVar { name } => assert_eq!(name, missing.env_var()),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_empty_variable_counts_as_missing() {
        let mut vars = full_env();
        vars.insert("CAMPUS_API_URL_DEV", "   ");

        let err = BaseUrls::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar { ref name } if name == "CAMPUS_API_URL_DEV")
        );
    }

    #[test]
    fn test_malformed_url_fails_fast() {
        let mut vars = full_env();
        vars.insert("CAMPUS_API_URL_LOCAL_PRODUCTION", "not a url");

        let err = BaseUrls::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap_err();
        match err {
            ConfigError::InvalidUrl { name, value } => {
                assert_eq!(name, "CAMPUS_API_URL_LOCAL_PRODUCTION");
                assert_eq!(value, "not a url");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!(
            "local-production".parse::<Environment>().unwrap(),
            Environment::LocalProduction
        );
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::default(), Environment::LocalProduction);
    }
}
