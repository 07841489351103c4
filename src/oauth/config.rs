//! Provider endpoints and client credentials.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::config::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const DEFAULT_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];
const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// OAuth client registration plus provider endpoints.
///
/// Required values are constructor parameters and are validated there, so a
/// `ProviderConfig` that exists is always usable.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    client_id: String,
    client_secret: SecretString,
    redirect_url: Url,
    auth_url: Url,
    token_url: Url,
    userinfo_url: Url,
    scopes: Vec<String>,
    timeout: Duration,
}

impl ProviderConfig {
    /// # Errors
    /// Returns [`ConfigError::MissingClientId`] or [`ConfigError::MissingClientSecret`]
    /// when either credential is blank.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        redirect_url: Url,
    ) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        if client_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingClientSecret);
        }

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url: default_url("auth", DEFAULT_AUTH_URL)?,
            token_url: default_url("token", DEFAULT_TOKEN_URL)?,
            userinfo_url: default_url("userinfo", DEFAULT_USERINFO_URL)?,
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        })
    }

    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    #[must_use]
    pub fn redirect_url(&self) -> &Url {
        &self.redirect_url
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn default_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|err| ConfigError::invalid_url(name, &err))
}
