//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{provider, session, token, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let session_opts = session::Options::parse(matches)?;
    let provider_opts = provider::Options::parse(matches)?;
    let token_opts = token::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        base_url: session_opts.base_url,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        state_ttl_seconds: session_opts.state_ttl_seconds,
        client_id: provider_opts.client_id,
        client_secret: provider_opts.client_secret,
        redirect_url: provider_opts.redirect_url,
        auth_url: provider_opts.auth_url,
        token_url: provider_opts.token_url,
        userinfo_url: provider_opts.userinfo_url,
        scopes: provider_opts.scopes,
        provider_timeout_seconds: provider_opts.timeout_seconds,
        jwt_secret: token_opts.secret,
        jwt_issuer: token_opts.issuer,
        access_ttl_seconds: token_opts.access_ttl_seconds,
        refresh_ttl_seconds: token_opts.refresh_ttl_seconds,
    }))
}
