//! Self-contained HS256 bearer tokens.
//!
//! An access/refresh pair is minted from one identity. Each token carries an
//! explicit `kind` claim so a long-lived refresh token is never accepted where
//! an access token is required. Verification needs only the shared secret and
//! the current time from the injected [`Clock`].

mod claims;
mod clock;
mod error;
mod service;

pub use claims::{Claims, TokenKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TokenError;
pub use service::{TokenConfig, TokenPair, TokenService, MAX_TTL_SECONDS};
