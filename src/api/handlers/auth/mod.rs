//! Auth handlers and supporting modules.
//!
//! Two independent mechanisms share this module:
//!
//! - **Delegated login** (`provider`): browser redirect to an OAuth provider,
//!   server-side session keyed by the `authgate_session` cookie.
//! - **Bearer tokens** (`token`, `principal`): username/password login that
//!   returns HS256 access/refresh tokens, and a middleware that guards
//!   `/protected/*` with access tokens only.

pub(crate) mod cookies;
mod error;
pub mod principal;
pub mod provider;
mod state;
pub mod token;
pub(crate) mod types;

pub use error::AuthError;
pub use state::{AuthConfig, AuthState};
