//! Main client implementation.
//!
//! Every request runs through the same pipeline:
//!
//! ```text
//! prepare_request ──► dispatch ──┬─► handle_response         (2xx)
//!                                ├─► handle_transport_error  (no response)
//!                                └─► handle_status_error     (non-2xx)
//!                                        │
//!                                        └─► 401: recover_session, re-dispatch once
//! ```
//!
//! Failures go two ways: a notification to the [`Notifier`] for the user and
//! an [`Error`] for the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use campus_config::{BaseUrls, Settings};

use crate::api::{IdentityApi, ResourceApi};
use crate::error::{Error, Result};
use crate::notify::{NoopRedirect, Notifier, SessionRedirect, Severity, TracingNotifier};
use crate::refresh::RefreshOutcome;
use crate::request::{ApiRequest, ApiResponse};
use crate::store::{ACCESS_TOKEN_KEY, CredentialStore, MemoryCredentialStore, REFRESH_TOKEN_KEY};
use crate::types::ErrorBody;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(campus_config::DEFAULT_TIMEOUT_MS);

/// Shown when an envelope reports failure without a message.
pub(crate) const OPERATION_FAILED_MESSAGE: &str = "Operation failed";

/// Shown when a request fails without any usable message.
pub(crate) const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Shown when no response was received.
pub(crate) const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Shown for failures the client did not anticipate.
pub(crate) const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error";

/// Shown when the session is torn down.
pub(crate) const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Campus API client.
///
/// Cheap to clone; clones share the HTTP connection pool and collaborators.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use campus_client::{CampusClient, FileCredentialStore};
///
/// # async fn example() -> campus_client::Result<()> {
/// let client = CampusClient::builder()
///     .base_url("http://localhost:5001")
///     .credential_store(Arc::new(FileCredentialStore::in_dir("/tmp/campus".as_ref())))
///     .build()?;
///
/// let courses = client.resource("Course").list(&Default::default()).await?;
/// println!("{} courses", courses.total_records.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CampusClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client for API requests.
    pub(crate) http: reqwest::Client,
    /// Plain HTTP client for the refresh endpoint; never intercepted.
    pub(crate) refresh_http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) redirect: Arc<dyn SessionRedirect>,
    /// Present when concurrent refreshes are collapsed into one.
    pub(crate) refresh_gate: Option<tokio::sync::Mutex<()>>,
}

/// What the error path decided.
enum Recovery {
    /// Credentials were refreshed; re-issue the request.
    Retry,
    /// Give up with this error.
    Fail(Error),
}

impl CampusClient {
    /// Get access to the inner client state (for API implementations).
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builder preconfigured from settings and resolved base URLs.
    pub fn builder_from_settings(settings: &Settings, urls: &BaseUrls) -> ClientBuilder {
        ClientBuilder::new()
            .base_url(urls.get(settings.environment))
            .timeout(Duration::from_millis(settings.timeout_ms))
            .single_flight_refresh(settings.single_flight_refresh)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// The credential store this client reads tokens from.
    pub fn credential_store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the identity API (sign-in, sign-out, refresh).
    pub fn identity(&self) -> IdentityApi {
        IdentityApi::new(self.clone())
    }

    /// Access a CRUD resource such as `"Course"` or `"Lesson"`.
    pub fn resource(&self, name: impl Into<String>) -> ResourceApi {
        ResourceApi::new(self.clone(), name.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Typed HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<crate::Envelope<T>> {
        self.send(ApiRequest::get(path)).await?.envelope()
    }

    /// Make a GET request with query parameters (repeated keys allowed).
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<crate::Envelope<T>> {
        let request = ApiRequest::get(path)
            .query_pairs(query.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self.send(request).await?.envelope()
    }

    /// Make a POST request.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<crate::Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.serialize_body(body)?;
        self.send(ApiRequest::post(path).json(body)).await?.envelope()
    }

    /// Make a PUT request.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<crate::Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.serialize_body(body)?;
        self.send(ApiRequest::put(path).json(body)).await?.envelope()
    }

    /// Make a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<crate::Envelope<T>> {
        self.send(ApiRequest::delete(path)).await?.envelope()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request through the authentication pipeline.
    ///
    /// A 401 is recovered at most once: the client refreshes the token pair,
    /// marks the request as retried and re-sends it. The retried request's
    /// outcome is returned as-is.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        loop {
            let prepared = self.prepare_request(&mut request)?;

            debug!(
                method = %request.method,
                url = %prepared.url(),
                retried = request.retried,
                "Dispatching request"
            );

            let outcome = match self.inner.http.execute(prepared).await {
                Ok(response) => ApiResponse::read(response).await,
                Err(e) => Err(Error::from(e)),
            };

            let recovery = match outcome {
                Ok(response) if response.status.is_success() => {
                    return self.handle_response(&request, response);
                }
                Ok(response) => self.handle_status_error(&mut request, response).await,
                Err(error) => self.handle_transport_error(error),
            };

            match recovery {
                Recovery::Retry => continue,
                Recovery::Fail(error) => return Err(error),
            }
        }
    }

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Outbound interception: resolve the URL, attach query, auth and body.
    fn prepare_request(&self, request: &mut ApiRequest) -> Result<reqwest::Request> {
        let token = self.inner.store.get(ACCESS_TOKEN_KEY);
        let prepared = self.build_request(request, token.as_deref());
        request.sent_token = token;

        prepared.map_err(|e| {
            let e = match e {
                Error::Prepare(_) => e,
                other => Error::Prepare(other.to_string()),
            };
            warn!("Failed to prepare {} {}: {}", request.method, request.path, e);
            self.notify_error(&e.to_string());
            e
        })
    }

    fn build_request(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Request> {
        let mut url = self.url(&request.path)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = request.headers.clone();
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, bearer(token)?);
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(headers)
            .timeout(self.inner.timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }

    /// Inbound interception, success path.
    fn handle_response(&self, request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse> {
        let Some(head) = response.head() else {
            return Ok(response);
        };

        if !head.is_success_status_code {
            let message = head
                .message
                .unwrap_or_else(|| OPERATION_FAILED_MESSAGE.to_string());
            self.notify_error(&message);
            return Err(Error::Business {
                status: head.status_code.unwrap_or(response.status.as_u16()),
                message,
            });
        }

        if let Some(message) = head.message
            && request.method != Method::GET
            && !request.suppress_success_message
        {
            self.inner.notifier.show(&message, Severity::Success);
        }

        Ok(response)
    }

    /// Inbound interception, failure path for responses with a status.
    async fn handle_status_error(
        &self,
        request: &mut ApiRequest,
        response: ApiResponse,
    ) -> Recovery {
        let status = response.status.as_u16();
        let body = ErrorBody::from_body(&response.body);

        debug!(status, path = %request.path, "Request failed");

        let error = if status == 400 && !body.field_errors.is_empty() {
            for message in &body.field_errors {
                self.notify_error(message);
            }
            Error::Validation {
                messages: body.field_errors,
            }
        } else {
            let message = body
                .message
                .or(body.title)
                .unwrap_or_else(|| format!("Request failed with status code {}", status));
            if status == 401 {
                // Reported only if recovery is not attempted
                return self.recover_session(request, message).await;
            }
            self.notify_error(&message);
            Error::Api { status, message }
        };

        Recovery::Fail(error)
    }

    /// Inbound interception, failure path without a response.
    fn handle_transport_error(&self, error: Error) -> Recovery {
        match &error {
            Error::Network(detail) => {
                warn!("Request failed without a response: {}", detail);
                self.notify_error(NETWORK_ERROR_MESSAGE);
            }
            other => {
                warn!("Unexpected request failure: {}", other);
                self.notify_error(UNEXPECTED_ERROR_MESSAGE);
            }
        }
        Recovery::Fail(error)
    }

    /// The 401 state machine: refresh once and retry, or expire the session.
    async fn recover_session(&self, request: &mut ApiRequest, message: String) -> Recovery {
        if request.retried {
            warn!(path = %request.path, "Retried request still unauthorized");
            self.notify_error(&message);
            return Recovery::Fail(Error::Unauthorized { message });
        }

        let Some(refresh_token) = self.inner.store.get(REFRESH_TOKEN_KEY) else {
            if !self.expired_by_concurrent_request(request.sent_token.as_deref()) {
                self.expire_session();
            }
            return Recovery::Fail(Error::SessionExpired);
        };
        let access_token = self.inner.store.get(ACCESS_TOKEN_KEY).unwrap_or_default();

        match self
            .refresh_tokens(&refresh_token, &access_token, request.sent_token.as_deref())
            .await
        {
            RefreshOutcome::Refreshed(_) => {
                // The new pair is in the store; prepare_request picks it up
                debug!(path = %request.path, "Retrying with refreshed token");
                request.retried = true;
                Recovery::Retry
            }
            RefreshOutcome::Failed => {
                self.expire_session();
                Recovery::Fail(Error::SessionExpired)
            }
            RefreshOutcome::AlreadyExpired => Recovery::Fail(Error::SessionExpired),
        }
    }

    /// Clear all credentials, tell the user, and send them to sign-in.
    pub(crate) fn expire_session(&self) {
        warn!("Session expired, clearing stored credentials");
        self.inner.store.clear_session();
        self.notify_error(SESSION_EXPIRED_MESSAGE);
        self.inner.redirect.redirect_to_sign_in();
    }

    pub(crate) fn notify_error(&self, message: &str) {
        let message = if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE
        } else {
            message
        };
        self.inner.notifier.show(message, Severity::Error);
    }

    fn serialize_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<serde_json::Value> {
        serde_json::to_value(body).map_err(|e| {
            self.notify_error(&e.to_string());
            Error::Prepare(e.to_string())
        })
    }
}

fn bearer(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::Prepare("access token is not a valid header value".to_string()))
}

/// Builder for creating a CampusClient.
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    redirect: Option<Arc<dyn SessionRedirect>>,
    single_flight_refresh: bool,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
            notifier: None,
            redirect: None,
            single_flight_refresh: false,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Where tokens are read from and written to. Defaults to an in-memory store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Where user notifications go. Defaults to the tracing log.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// What happens on forced sign-out. Defaults to a log line.
    pub fn redirect(mut self, redirect: Arc<dyn SessionRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Collapse concurrent token refreshes into a single refresh call.
    ///
    /// Off by default: every request that receives a 401 refreshes on its own.
    pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
        self.single_flight_refresh = enabled;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<CampusClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("campus-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let refresh_http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(CampusClient {
            inner: Arc::new(ClientInner {
                http,
                refresh_http,
                base_url,
                timeout: self.timeout,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                redirect: self.redirect.unwrap_or_else(|| Arc::new(NoopRedirect)),
                refresh_gate: self
                    .single_flight_refresh
                    .then(|| tokio::sync::Mutex::new(())),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
