//! Delegated login against an external OAuth 2.0 identity provider.
//!
//! Flow Overview:
//! 1. [`LoginFlow::begin_login`] mints an anti-forgery `state` and the provider
//!    authorization URL. The caller stores the state client-side and redirects.
//! 2. [`LoginFlow::handle_callback`] rejects any callback whose `state` does not
//!    match before touching the network, then exchanges the code and fetches
//!    the profile.
//! 3. [`LoginFlow::create_session`] persists the identity under a fresh session id.
//!
//! Provider calls are single-attempt and bounded by the configured timeout.

mod client;
mod config;
mod error;
mod flow;
mod state;

pub use client::{DelegatedIdentity, ProviderClient, ProviderToken};
pub use config::{
    ProviderConfig, DEFAULT_AUTH_URL, DEFAULT_SCOPES, DEFAULT_TOKEN_URL, DEFAULT_USERINFO_URL,
};
pub use error::FlowError;
pub use flow::{LoginFlow, PendingLogin};
pub use state::generate_state;
