//! HTTP calls to the identity provider.

use reqwest::{header::ACCEPT, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};
use url::Url;
use utoipa::ToSchema;

use super::config::ProviderConfig;
use super::error::{describe, FlowError};

/// Provider profile as returned by the userinfo endpoint.
///
/// A point-in-time snapshot; it is never refreshed from the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DelegatedIdentity {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: String,
    #[serde(default)]
    pub locale: String,
}

/// Token endpoint response. Only `access_token` is required.
#[derive(Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderToken")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Thin client over the provider's authorization, token and userinfo endpoints.
#[derive(Clone, Debug)]
pub struct ProviderClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Build a client whose requests are bounded by the configured timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Authorization URL carrying `state` and requesting offline access.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.config.auth_url().clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", self.config.client_id())
            .append_pair("redirect_uri", self.config.redirect_url().as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes().join(" "))
            .append_pair("state", state);
        url
    }

    /// Trade an authorization code for a provider access token. Single attempt.
    ///
    /// # Errors
    /// [`FlowError::ExchangeFailed`] on transport errors, timeouts, non-2xx
    /// responses, and bodies without an access token.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<ProviderToken, FlowError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url().as_str()),
            ("client_id", self.config.client_id()),
            ("client_secret", self.config.client_secret().expose_secret()),
        ];

        let response = self
            .http
            .post(self.config.token_url().clone())
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|err| FlowError::ExchangeFailed(describe(&err)))?;

        let response = ensure_success(response).map_err(FlowError::ExchangeFailed)?;

        let token: ProviderToken = response
            .json()
            .await
            .map_err(|err| FlowError::ExchangeFailed(describe(&err)))?;

        if token.access_token.is_empty() {
            return Err(FlowError::ExchangeFailed(
                "token response has an empty access_token".to_string(),
            ));
        }

        debug!(token_type = ?token.token_type, "Authorization code exchanged");
        Ok(token)
    }

    /// Fetch the profile for a provider access token.
    ///
    /// # Errors
    /// [`FlowError::ProfileFetchFailed`] on transport errors, timeouts and
    /// non-2xx responses; [`FlowError::ProfileParseFailed`] when the body is not
    /// a valid profile document.
    #[instrument(skip_all)]
    pub async fn fetch_identity(&self, access_token: &str) -> Result<DelegatedIdentity, FlowError> {
        let response = self
            .http
            .get(self.config.userinfo_url().clone())
            .header(ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| FlowError::ProfileFetchFailed(describe(&err)))?;

        let response = ensure_success(response).map_err(FlowError::ProfileFetchFailed)?;

        let body = response
            .bytes()
            .await
            .map_err(|err| FlowError::ProfileFetchFailed(describe(&err)))?;

        serde_json::from_slice(&body).map_err(|err| FlowError::ProfileParseFailed(err.to_string()))
    }
}

fn ensure_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!("provider returned {status}"))
    }
}
