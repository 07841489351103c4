//! Startup configuration errors.
//!
//! Constructors for the provider client and the token service validate their
//! inputs once; any error here is fatal and stops the process before it serves.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("provider client id is not configured")]
    MissingClientId,
    #[error("provider client secret is not configured")]
    MissingClientSecret,
    #[error("token signing secret is not configured")]
    MissingSigningSecret,
    #[error("invalid {name} URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },
    #[error("{name} must be greater than zero")]
    NonPositiveDuration { name: &'static str },
    #[error("{name} must not exceed {max} seconds")]
    DurationTooLong { name: &'static str, max: i64 },
}

impl ConfigError {
    pub(crate) fn invalid_url(name: &'static str, err: &url::ParseError) -> Self {
        Self::InvalidUrl {
            name,
            reason: err.to_string(),
        }
    }
}
