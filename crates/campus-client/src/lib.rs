//! Authenticated HTTP client for the Campus learning-management API.
//!
//! The client attaches the stored bearer token to every request, turns
//! failed envelopes and error responses into user notifications plus typed
//! errors, and recovers once from an expired access token by refreshing the
//! token pair and re-sending the request. When recovery is impossible the
//! session is cleared and the user is sent back to sign-in.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use campus_client::{CampusClient, MemoryCredentialStore, PageQuery, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = CampusClient::builder()
//!     .base_url("http://localhost:5001")
//!     .credential_store(Arc::new(MemoryCredentialStore::new()))
//!     .build()?;
//!
//! client.identity().sign_in("admin@campus.example", "secret").await?;
//!
//! let lessons = client.resource("Lesson").list(&PageQuery::page(1, 20)).await?;
//! println!("{:?}", lessons.result);
//! # Ok(())
//! # }
//! ```
//!
//! # Collaborators
//!
//! - [`CredentialStore`]: where tokens live (in memory or a JSON file)
//! - [`Notifier`]: toast-style user notifications
//! - [`SessionRedirect`]: forced sign-out side effect

pub mod api;
pub mod client;
pub mod error;
pub mod notify;
mod refresh;
pub mod request;
pub mod store;
pub mod types;

pub use api::{ADMIN_RESOURCES, IdentityApi, ResourceApi};
pub use client::{CampusClient, ClientBuilder};
pub use error::{Error, Result};
pub use notify::{NoopRedirect, Notifier, SessionRedirect, Severity, TracingNotifier};
pub use refresh::REFRESH_PATH;
pub use request::{ApiRequest, ApiResponse};
pub use store::{
    ACCESS_TOKEN_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    REFRESH_TOKEN_KEY, SESSION_KEYS, USER_ID_KEY, USER_PROFILE_KEY,
};
pub use types::*;
