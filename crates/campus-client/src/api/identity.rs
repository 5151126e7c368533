//! Identity API.

use serde_json::Value;

use crate::client::CampusClient;
use crate::error::{Error, Result};
use crate::refresh::RefreshOutcome;
use crate::request::ApiRequest;
use crate::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_ID_KEY, USER_PROFILE_KEY};
use crate::types::{SignInRequest, SignInResult, TokenPair};

/// Sign-in endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "Identity/Login";

/// Identity API client.
pub struct IdentityApi {
    client: CampusClient,
}

impl IdentityApi {
    pub(crate) fn new(client: CampusClient) -> Self {
        Self { client }
    }

    /// Sign in and persist the session credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResult> {
        let body = serde_json::to_value(SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;

        let result: SignInResult = self
            .client
            .send(ApiRequest::post(LOGIN_PATH).json(body))
            .await?
            .envelope()?
            .into_result()?;

        let store = self.client.credential_store();
        store.set(ACCESS_TOKEN_KEY, &result.token);
        store.set(REFRESH_TOKEN_KEY, &result.refresh_token);
        match &result.user_id {
            Some(Value::String(id)) => store.set(USER_ID_KEY, id),
            Some(Value::Null) | None => store.remove(USER_ID_KEY),
            Some(other) => store.set(USER_ID_KEY, &other.to_string()),
        }
        match &result.user {
            Some(profile) => store.set(USER_PROFILE_KEY, &profile.to_string()),
            None => store.remove(USER_PROFILE_KEY),
        }

        tracing::info!("Signed in as {}", email);
        Ok(result)
    }

    /// Clear every stored session credential.
    pub fn sign_out(&self) {
        self.client.credential_store().clear_session();
        tracing::info!("Signed out");
    }

    /// Whether an access token is stored.
    pub fn is_signed_in(&self) -> bool {
        self.client.credential_store().get(ACCESS_TOKEN_KEY).is_some()
    }

    /// Stored user id, if signed in.
    pub fn user_id(&self) -> Option<String> {
        self.client.credential_store().get(USER_ID_KEY)
    }

    /// Stored user profile, if signed in and parseable.
    pub fn profile(&self) -> Option<Value> {
        self.client
            .credential_store()
            .get(USER_PROFILE_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Refresh the token pair now, without waiting for a 401.
    ///
    /// Fails with [`Error::SessionExpired`] when no refresh token is stored
    /// or the server refuses to mint a new pair. Stored credentials are left
    /// untouched on failure.
    pub async fn refresh(&self) -> Result<TokenPair> {
        let store = self.client.credential_store();
        let refresh_token = store.get(REFRESH_TOKEN_KEY).ok_or(Error::SessionExpired)?;
        let access_token = store.get(ACCESS_TOKEN_KEY);

        match self
            .client
            .refresh_tokens(
                &refresh_token,
                access_token.as_deref().unwrap_or_default(),
                access_token.as_deref(),
            )
            .await
        {
            RefreshOutcome::Refreshed(tokens) => Ok(tokens),
            RefreshOutcome::Failed | RefreshOutcome::AlreadyExpired => Err(Error::SessionExpired),
        }
    }
}
