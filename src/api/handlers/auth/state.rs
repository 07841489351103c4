//! Shared handler state and cookie settings.

use std::sync::Arc;
use url::Url;

use crate::credential::CredentialStore;
use crate::oauth::LoginFlow;
use crate::token::TokenService;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;
const DEFAULT_STATE_TTL_SECONDS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: Url,
    session_ttl_seconds: i64,
    state_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            state_ttl_seconds: DEFAULT_STATE_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_state_ttl_seconds(mut self, seconds: i64) -> Self {
        self.state_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn state_ttl_seconds(&self) -> i64 {
        self.state_ttl_seconds
    }

    /// Only mark cookies secure when the service is reached over HTTPS.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

pub struct AuthState {
    config: AuthConfig,
    flow: LoginFlow,
    tokens: TokenService,
    credentials: Arc<CredentialStore>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        flow: LoginFlow,
        tokens: TokenService,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            config,
            flow,
            tokens,
            credentials,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn flow(&self) -> &LoginFlow {
        &self.flow
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_cookies_follow_scheme() -> Result<(), url::ParseError> {
        assert!(!AuthConfig::new(Url::parse("http://localhost:8080")?).secure_cookies());
        assert!(AuthConfig::new(Url::parse("https://auth.example.com")?).secure_cookies());
        Ok(())
    }

    #[test]
    fn ttl_defaults() -> Result<(), url::ParseError> {
        let config = AuthConfig::new(Url::parse("http://localhost:8080")?);
        assert_eq!(config.session_ttl_seconds(), 86_400);
        assert_eq!(config.state_ttl_seconds(), 3_600);
        Ok(())
    }
}
