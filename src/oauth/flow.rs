//! Delegated login state machine: `Idle -> Pending -> Authenticated | Rejected`.
//!
//! Pending attempts are not tracked server-side; the anti-forgery token lives
//! with the client until the callback consumes it.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::client::{DelegatedIdentity, ProviderClient};
use super::error::FlowError;
use super::state::{generate_state, states_match};
use crate::session::{generate_session_id, SessionStore};

/// Result of [`LoginFlow::begin_login`]: persist `state`, redirect to `redirect_url`.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub state: String,
    pub redirect_url: Url,
}

pub struct LoginFlow {
    client: ProviderClient,
    sessions: Arc<dyn SessionStore>,
}

impl LoginFlow {
    #[must_use]
    pub fn new(client: ProviderClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self { client, sessions }
    }

    #[must_use]
    pub fn client(&self) -> &ProviderClient {
        &self.client
    }

    /// Start a new attempt. Earlier pending attempts are left untouched.
    ///
    /// # Errors
    /// Returns [`FlowError::Entropy`] if no random state can be generated.
    pub fn begin_login(&self) -> Result<PendingLogin, FlowError> {
        let state = generate_state()?;
        let redirect_url = self.client.authorization_url(&state);
        debug!("Delegated login started");
        Ok(PendingLogin {
            state,
            redirect_url,
        })
    }

    /// Validate the callback and resolve the provider identity.
    ///
    /// The state check runs first and a mismatch returns before any network
    /// call. A missing state on either side counts as a mismatch.
    ///
    /// # Errors
    /// [`FlowError::StateMismatch`], [`FlowError::MissingCode`], or the
    /// exchange/profile errors from [`ProviderClient`].
    #[instrument(skip_all)]
    pub async fn handle_callback(
        &self,
        received_state: Option<&str>,
        stored_state: Option<&str>,
        code: Option<&str>,
    ) -> Result<DelegatedIdentity, FlowError> {
        let state_ok = match (received_state, stored_state) {
            (Some(received), Some(stored)) => !stored.is_empty() && states_match(received, stored),
            _ => false,
        };
        if !state_ok {
            warn!("Invalid OAuth state");
            return Err(FlowError::StateMismatch);
        }

        let Some(code) = code.filter(|code| !code.is_empty()) else {
            warn!("Authorization code not found");
            return Err(FlowError::MissingCode);
        };

        let token = self.client.exchange_code(code).await?;
        let identity = self.client.fetch_identity(&token.access_token).await?;

        info!(provider_id = %identity.id, "Delegated login succeeded");
        Ok(identity)
    }

    /// Store `identity` under a new unguessable session id and return the id.
    ///
    /// # Errors
    /// Returns [`FlowError::Entropy`] if no session id can be generated.
    pub fn create_session(&self, identity: DelegatedIdentity) -> Result<String, FlowError> {
        let session_id = generate_session_id()?;
        self.sessions.put(&session_id, identity);
        Ok(session_id)
    }

    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<DelegatedIdentity> {
        self.sessions.get(session_id)
    }

    /// Idempotent; unknown ids are ignored.
    pub fn end_session(&self, session_id: &str) {
        self.sessions.delete(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::ProviderConfig;
    use crate::session::MemorySessionStore;
    use anyhow::Result;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn flow_for(server_uri: &str, timeout: Duration) -> Result<LoginFlow> {
        let config = ProviderConfig::new(
            "client-id",
            SecretString::from("client-secret".to_string()),
            Url::parse("http://localhost:8080/auth/provider/callback")?,
        )?
        .with_token_url(Url::parse(&format!("{server_uri}/token"))?)
        .with_userinfo_url(Url::parse(&format!("{server_uri}/userinfo"))?)
        .with_timeout(timeout);
        Ok(LoginFlow::new(
            ProviderClient::new(config)?,
            Arc::new(MemorySessionStore::new()),
        ))
    }

    fn profile() -> serde_json::Value {
        json!({
            "id": "108",
            "email": "ada@example.com",
            "verified_email": true,
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "picture": "https://example.com/ada.png",
            "locale": "en"
        })
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.map_or(0, |requests| requests.len())
    }

    #[tokio::test]
    async fn begin_login_url_carries_returned_state() -> Result<()> {
        let flow = flow_for("http://127.0.0.1:1", Duration::from_secs(1))?;
        let pending = flow.begin_login()?;

        let state = pending
            .redirect_url
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned());
        assert_eq!(state.as_deref(), Some(pending.state.as_str()));
        assert!(pending
            .redirect_url
            .as_str()
            .contains(&format!("state={}", pending.state)));
        Ok(())
    }

    #[tokio::test]
    async fn state_mismatch_never_reaches_provider() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .expect(0)
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_secs(2))?;
        let cases: [(Option<&str>, Option<&str>); 7] = [
            (Some("a"), Some("b")),
            (Some("abc"), Some("abd")),
            (Some("abc"), Some("abc ")),
            (Some(""), Some("stored")),
            (Some("received"), None),
            (None, Some("stored")),
            (None, None),
        ];
        for (received, stored) in cases {
            let result = flow.handle_callback(received, stored, Some("code")).await;
            assert!(
                matches!(result, Err(FlowError::StateMismatch)),
                "expected mismatch for {received:?} / {stored:?}"
            );
        }
        // Empty stored state never matches, even against an empty received state.
        let result = flow.handle_callback(Some(""), Some(""), Some("code")).await;
        assert!(matches!(result, Err(FlowError::StateMismatch)));

        assert_eq!(request_count(&server).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn matching_state_without_code_is_missing_code() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let flow = flow_for(&server.uri(), Duration::from_secs(2))?;
        let pending = flow.begin_login()?;

        for code in [None, Some("")] {
            let result = flow
                .handle_callback(Some(&pending.state), Some(&pending.state), code)
                .await;
            assert!(matches!(result, Err(FlowError::MissingCode)));
        }
        assert_eq!(request_count(&server).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn successful_callback_resolves_identity() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("client_id=client-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "provider-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer provider-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_secs(2))?;
        let pending = flow.begin_login()?;
        let identity = flow
            .handle_callback(Some(&pending.state), Some(&pending.state), Some("auth-code"))
            .await?;

        assert_eq!(identity.id, "108");
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.given_name, "Ada");
        Ok(())
    }

    #[tokio::test]
    async fn token_endpoint_error_is_exchange_failed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
            .expect(0)
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_secs(2))?;
        let result = flow.handle_callback(Some("s"), Some("s"), Some("bad-code")).await;
        assert!(matches!(result, Err(FlowError::ExchangeFailed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_token_response_is_exchange_failed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_secs(2))?;
        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        assert!(matches!(result, Err(FlowError::ExchangeFailed(_))));

        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})))
            .mount(&server)
            .await;
        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        assert!(matches!(result, Err(FlowError::ExchangeFailed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn slow_token_endpoint_times_out_as_exchange_failed() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "t"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_millis(200))?;
        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        match result {
            Err(FlowError::ExchangeFailed(reason)) => assert_eq!(reason, "request timed out"),
            other => panic!("expected exchange timeout, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn userinfo_errors_map_to_profile_failures() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(profile())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let flow = flow_for(&server.uri(), Duration::from_millis(500))?;

        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        assert!(matches!(result, Err(FlowError::ProfileFetchFailed(_))));

        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        assert!(matches!(result, Err(FlowError::ProfileParseFailed(_))));

        let result = flow.handle_callback(Some("s"), Some("s"), Some("code")).await;
        assert!(matches!(result, Err(FlowError::ProfileFetchFailed(_))));
        Ok(())
    }

    #[tokio::test]
    async fn sessions_are_created_looked_up_and_ended() -> Result<()> {
        let flow = flow_for("http://127.0.0.1:1", Duration::from_secs(1))?;
        let identity: DelegatedIdentity = serde_json::from_value(profile())?;

        let first = flow.create_session(identity.clone())?;
        let second = flow.create_session(identity.clone())?;
        assert_ne!(first, second);
        assert_eq!(flow.session(&first), Some(identity));

        flow.end_session(&first);
        flow.end_session(&first);
        assert!(flow.session(&first).is_none());
        assert!(flow.session(&second).is_some());
        Ok(())
    }
}
