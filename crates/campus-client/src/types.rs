//! Wire types for the Campus API.
//!
//! Every response body follows the same envelope:
//! `{ "statusCode": 200, "message": "...", "result": ... }`, optionally with
//! pagination fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Server response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Status code reported by the server (mirrors the HTTP status).
    #[serde(default)]
    pub status_code: u16,
    /// Human-readable message, shown to the user on failure or mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation payload.
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Explicit success flag, when the server serializes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_success_status_code: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    /// Envelope for a response that carried no body.
    pub fn empty(status_code: u16) -> Self {
        Self {
            status_code,
            message: None,
            result: None,
            is_success_status_code: None,
            page_number: None,
            page_size: None,
            total_records: None,
        }
    }

    /// `200 <= statusCode < 300`, unless the server sent an explicit flag.
    pub fn is_success(&self) -> bool {
        self.is_success_status_code
            .unwrap_or((200..300).contains(&self.status_code))
    }

    /// Whether pagination fields are present.
    pub fn is_paged(&self) -> bool {
        self.total_records.is_some()
    }

    /// Take the payload, failing when the server sent none.
    pub fn into_result(self) -> Result<T> {
        self.result
            .ok_or_else(|| Error::Envelope("response carried no result".to_string()))
    }
}

/// The part of an envelope the client inspects on every 2xx response.
///
/// Only produced for bodies that are JSON objects carrying a boolean
/// `isSuccessStatusCode`; anything else passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeHead {
    pub status_code: Option<u16>,
    pub message: Option<String>,
    pub is_success_status_code: bool,
}

impl EnvelopeHead {
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let object = value.as_object()?;
        let is_success_status_code = object.get("isSuccessStatusCode")?.as_bool()?;

        Some(Self {
            status_code: object
                .get("statusCode")
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
            message: non_empty_str(object.get("message")),
            is_success_status_code,
        })
    }
}

/// Fields of an error response body the client uses for notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub title: Option<String>,
    /// Flattened `"field: message"` entries from an `errors` map.
    pub field_errors: Vec<String>,
}

impl ErrorBody {
    pub(crate) fn from_body(body: &[u8]) -> Self {
        let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let mut field_errors = Vec::new();
        if let Some(Value::Object(errors)) = object.get("errors") {
            for (field, messages) in errors {
                match messages {
                    Value::Array(items) => {
                        for item in items {
                            if let Some(text) = item.as_str() {
                                field_errors.push(format!("{}: {}", field, text));
                            }
                        }
                    }
                    Value::String(text) => field_errors.push(format!("{}: {}", field, text)),
                    _ => {}
                }
            }
        }

        Self {
            message: non_empty_str(object.get("message")),
            title: non_empty_str(object.get("title")),
            field_errors,
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST Identity/RefreshToken`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
    pub access_token: String,
}

/// New credentials minted by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// New access token.
    pub token: String,
    /// New refresh token.
    pub refresh_token: String,
}

/// Body of `POST Identity/Login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResult {
    pub token: String,
    pub refresh_token: String,
    /// User id; numeric or string depending on the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    /// Profile of the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Paging
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for paged list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    /// Repeated filter ids, serialized as `ids=a&ids=b`.
    pub ids: Vec<String>,
}

impl PageQuery {
    /// A single page.
    pub fn page(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: Some(page_number),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Query pairs in wire order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(n) = self.page_number {
            pairs.push(("pageNumber".to_string(), n.to_string()));
        }
        if let Some(n) = self.page_size {
            pairs.push(("pageSize".to_string(), n.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for id in &self.ids {
            pairs.push(("ids".to_string(), id.clone()));
        }
        pairs
    }
}
