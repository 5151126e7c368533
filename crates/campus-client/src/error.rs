//! Client error types.
//!
//! Every failure that crosses the client boundary is one of these variants.
//! Transport errors are flattened into messages; the underlying `reqwest`
//! error never escapes to callers.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be prepared (auth header, body serialization).
    #[error("Failed to prepare request: {0}")]
    Prepare(String),

    /// Transport succeeded but the envelope reported a failed operation.
    #[error("{message}")]
    Business {
        /// Status code reported inside the envelope.
        status: u16,
        /// Message reported by the server.
        message: String,
    },

    /// HTTP 400 carrying a field-keyed `errors` map.
    #[error("Validation failed: {}", messages.join("; "))]
    Validation {
        /// One `"field: message"` entry per server message.
        messages: Vec<String>,
    },

    /// HTTP 401 that was not recovered by a token refresh.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Message reported by the server.
        message: String,
    },

    /// Credentials were cleared and the user must sign in again.
    #[error("Session expired")]
    SessionExpired,

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the server, or a generic one.
        message: String,
    },

    /// Network failure or timeout; no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the envelope contract.
    #[error("Invalid response envelope: {0}")]
    Envelope(String),

    /// Anything the client did not anticipate.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthorized { .. } | Error::SessionExpired)
            || matches!(self, Error::Api { status: 401, .. })
    }

    /// Check if the session was torn down.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired)
    }

    /// Check if this is a field validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Error::Unexpected(e.to_string())
        } else if e.is_timeout() {
            Error::Network("request timed out".to_string())
        } else if e.is_decode() {
            Error::Envelope(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Envelope(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(Error::SessionExpired.is_auth_error());
        assert!(Error::SessionExpired.is_session_expired());
        assert!(
            Error::Unauthorized {
                message: "expired".into()
            }
            .is_auth_error()
        );
        assert!(
            Error::Api {
                status: 503,
                message: "down".into()
            }
            .is_server_error()
        );
        assert!(
            Error::Api {
                status: 404,
                message: "missing".into()
            }
            .is_not_found()
        );
        assert!(!Error::Network("reset".into()).is_auth_error());
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = Error::Validation {
            messages: vec!["email: required".into(), "age: invalid".into()],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: email: required; age: invalid"
        );
    }

    #[test]
    fn test_business_display_is_server_message() {
        let err = Error::Business {
            status: 409,
            message: "Course code already exists".into(),
        };
        assert_eq!(err.to_string(), "Course code already exists");
    }
}
