use crate::{
    api::{self, AuthConfig, AuthState},
    cli::telemetry,
    credential::CredentialStore,
    oauth::{LoginFlow, ProviderClient, ProviderConfig},
    session::MemorySessionStore,
    token::{TokenConfig, TokenService},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub base_url: Url,
    pub session_ttl_seconds: i64,
    pub state_ttl_seconds: i64,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
    pub scopes: Vec<String>,
    pub provider_timeout_seconds: u64,
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

/// Build the shared state from the parsed arguments.
///
/// # Errors
/// Returns an error if any component rejects its configuration.
pub fn build_state(args: Args) -> Result<AuthState> {
    let provider = ProviderConfig::new(args.client_id, args.client_secret, args.redirect_url)
        .context("invalid provider configuration")?
        .with_auth_url(args.auth_url)
        .with_token_url(args.token_url)
        .with_userinfo_url(args.userinfo_url)
        .with_scopes(args.scopes)
        .with_timeout(Duration::from_secs(args.provider_timeout_seconds));
    let client = ProviderClient::new(provider).context("failed to build provider HTTP client")?;

    let session_ttl = u64::try_from(args.session_ttl_seconds)
        .context("session TTL must be positive")?;
    let sessions = Arc::new(MemorySessionStore::new().with_ttl(Duration::from_secs(session_ttl)));
    let flow = LoginFlow::new(client, sessions);

    let credentials = Arc::new(CredentialStore::with_reference_users());
    debug!("Loaded {} reference credentials", credentials.len());

    let token_config = TokenConfig::new(args.jwt_secret)
        .context("invalid token configuration")?
        .with_issuer(args.jwt_issuer)
        .with_access_ttl_seconds(args.access_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_ttl_seconds);
    let tokens = TokenService::new(token_config, Arc::clone(&credentials))
        .context("invalid token configuration")?;

    let config = AuthConfig::new(args.base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_state_ttl_seconds(args.state_ttl_seconds);

    Ok(AuthState::new(config, flow, tokens, credentials))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let port = args.port;
    let state = Arc::new(build_state(args)?);

    info!(
        "Delegated login via {}",
        state.flow().client().config().auth_url()
    );

    let result = api::new(port, state).await;

    telemetry::shutdown_tracer();

    result
}
