//! # Authgate (Delegated Login & Bearer Tokens)
//!
//! `authgate` establishes proof of identity for HTTP clients using two
//! independent mechanisms that share one process.
//!
//! ## Delegated Login
//!
//! A browser is redirected to an external identity provider with an
//! anti-forgery `state` value that is also stored in a short-lived cookie. The
//! callback must present the same `state`; only then is the authorization code
//! exchanged for a provider access token and the profile fetched. The resolved
//! profile is stored in a server-side session keyed by an unguessable id that
//! travels back as an `HttpOnly` cookie.
//!
//! ## Bearer Tokens
//!
//! `POST /login` checks a username and password against bcrypt hashes and
//! returns an HS256-signed access token (15 minutes) and refresh token (7 days).
//! Both carry a `kind` claim; `/protected/*` only accepts access tokens and a
//! refresh always rotates both tokens.
//!
//! Token verification is stateless: it depends on the signing secret and the
//! clock only, so individual tokens cannot be revoked before they expire.

pub mod api;
pub mod cli;
pub mod config;
pub mod credential;
pub mod oauth;
pub mod session;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
