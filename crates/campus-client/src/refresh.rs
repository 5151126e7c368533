//! Token refresh.
//!
//! The refresh call goes through a separate, plain HTTP client: no bearer
//! header, no envelope interception and no retry-on-401, so a failing refresh
//! can never recurse into another refresh.
//!
//! By default each request that receives a 401 refreshes independently, so N
//! concurrent failures issue N refresh calls and the last writer's tokens win.
//! With single-flight enabled, refreshes are serialized behind an async mutex
//! and a request whose rejected token has already been replaced reuses the
//! stored pair instead of refreshing again.

use tracing::{debug, info, warn};

use crate::client::CampusClient;
use crate::error::{Error, Result};
use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::types::{Envelope, ErrorBody, RefreshRequest, TokenPair};

/// Refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "Identity/RefreshToken";

/// How a refresh attempt ended.
#[derive(Debug)]
pub(crate) enum RefreshOutcome {
    /// A usable pair is stored.
    Refreshed(TokenPair),
    /// This caller's refresh failed; the session must be expired.
    Failed,
    /// Another caller already expired the session.
    AlreadyExpired,
}

impl CampusClient {
    /// Obtain a fresh token pair after a 401.
    ///
    /// `rejected_token` is the access token the failed request carried.
    pub(crate) async fn refresh_tokens(
        &self,
        refresh_token: &str,
        access_token: &str,
        rejected_token: Option<&str>,
    ) -> RefreshOutcome {
        let Some(gate) = &self.inner().refresh_gate else {
            return self.refresh_once(refresh_token, access_token).await;
        };

        let _guard = gate.lock().await;

        let store = &self.inner().store;
        let current_access = store.get(ACCESS_TOKEN_KEY);
        let Some(current_refresh) = store.get(REFRESH_TOKEN_KEY) else {
            debug!("Session was cleared while waiting for refresh");
            return RefreshOutcome::AlreadyExpired;
        };

        if let Some(current) = &current_access
            && rejected_token.is_some_and(|rejected| rejected != current.as_str())
        {
            debug!("Token already refreshed by a concurrent request");
            return RefreshOutcome::Refreshed(TokenPair {
                token: current.clone(),
                refresh_token: current_refresh,
            });
        }

        let access = current_access.unwrap_or_else(|| access_token.to_string());
        self.refresh_once(&current_refresh, &access).await
    }

    /// With single-flight on, whether a concurrent request already tore down
    /// the session this request was sent under.
    pub(crate) fn expired_by_concurrent_request(&self, sent_token: Option<&str>) -> bool {
        self.inner().refresh_gate.is_some()
            && sent_token.is_some()
            && self.inner().store.get(ACCESS_TOKEN_KEY).is_none()
    }

    /// One call to the refresh endpoint; persists the new pair on success.
    async fn refresh_once(&self, refresh_token: &str, access_token: &str) -> RefreshOutcome {
        match self.call_refresh_endpoint(refresh_token, access_token).await {
            Ok(Some(tokens)) => {
                let store = &self.inner().store;
                store.set(ACCESS_TOKEN_KEY, &tokens.token);
                store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token);
                info!("Access token refreshed");
                RefreshOutcome::Refreshed(tokens)
            }
            Ok(None) => {
                warn!("Refresh endpoint did not return new tokens");
                RefreshOutcome::Failed
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.notify_error(&refresh_failure_message(&e));
                RefreshOutcome::Failed
            }
        }
    }

    async fn call_refresh_endpoint(
        &self,
        refresh_token: &str,
        access_token: &str,
    ) -> Result<Option<TokenPair>> {
        let url = self.url(REFRESH_PATH)?;
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
            access_token: access_token.to_string(),
        };

        let response = self
            .inner()
            .refresh_http
            .post(url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = ErrorBody::from_body(&bytes);
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.message.or(body.title).unwrap_or_else(|| {
                    format!("Request failed with status code {}", status.as_u16())
                }),
            });
        }

        let envelope: Envelope<TokenPair> = serde_json::from_slice(&bytes)?;
        if !envelope.is_success() {
            return Ok(None);
        }
        Ok(envelope.result)
    }
}

fn refresh_failure_message(error: &Error) -> String {
    match error {
        Error::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
