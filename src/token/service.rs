//! Token minting, verification and rotation.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::claims::{Claims, TokenKind};
use super::clock::{Clock, SystemClock};
use super::error::TokenError;
use crate::config::ConfigError;
use crate::credential::{Credential, CredentialStore};

const DEFAULT_ISSUER: &str = "authgate";
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound for either token lifetime (ten years).
pub const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct TokenConfig {
    secret: SecretString,
    issuer: String,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenConfig {
    /// # Errors
    /// Returns [`ConfigError::MissingSigningSecret`] for a blank secret.
    pub fn new(secret: SecretString) -> Result<Self, ConfigError> {
        if secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }
        Ok(Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
        })
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }
}

/// Freshly minted pair; `expires_in` is the access token lifetime in seconds.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
    credentials: Arc<CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// # Errors
    /// Returns [`ConfigError::NonPositiveDuration`] if a lifetime is not positive
    /// and [`ConfigError::DurationTooLong`] if it exceeds [`MAX_TTL_SECONDS`].
    pub fn new(
        config: TokenConfig,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ConfigError> {
        check_lifetime("access token lifetime", config.access_ttl_seconds)?;
        check_lifetime("refresh token lifetime", config.refresh_ttl_seconds)?;

        let secret = config.secret.expose_secret().as_bytes();
        let encoding_key = EncodingKey::from_secret(secret);
        let decoding_key = DecodingKey::from_secret(secret);

        // Expiry is checked against the injected clock, not the system time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.set_issuer(&[config.issuer.as_str()]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            config,
            credentials,
            clock: Arc::new(SystemClock),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Mint an access token and a refresh token for `credential`.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if encoding fails or an expiry overflows.
    pub fn issue_token_pair(&self, credential: &Credential) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let access_token = self.sign(credential, TokenKind::Access, now)?;
        let refresh_token = self.sign(credential, TokenKind::Refresh, now)?;
        debug!(user_id = credential.id, "Token pair issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_ttl_seconds,
        })
    }

    /// Decode and check a token of either kind.
    ///
    /// # Errors
    /// [`TokenError::MalformedToken`], [`TokenError::BadSignature`],
    /// [`TokenError::WrongIssuer`] or [`TokenError::Expired`].
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Like [`Self::verify_token`] but only accepts access tokens.
    ///
    /// # Errors
    /// Any error of [`Self::verify_token`], or [`TokenError::WrongKind`].
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(TokenError::WrongKind {
                expected: TokenKind::Access,
                found: claims.kind,
            });
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a brand-new pair. The old refresh token is
    /// not reused.
    ///
    /// # Errors
    /// [`TokenError::InvalidRefreshToken`] when the token fails verification or
    /// is not a refresh token; [`TokenError::UserNotFound`] when its subject is
    /// no longer registered.
    #[instrument(skip_all)]
    pub fn refresh_token_pair(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify_token(refresh_token).map_err(|err| {
            debug!("Refresh token rejected: {err}");
            TokenError::InvalidRefreshToken
        })?;
        if claims.kind != TokenKind::Refresh {
            debug!(kind = %claims.kind, "Refresh attempted with non-refresh token");
            return Err(TokenError::InvalidRefreshToken);
        }

        let credential = self
            .credentials
            .find(&claims.username)
            .ok_or(TokenError::UserNotFound)?;

        self.issue_token_pair(credential)
    }

    fn sign(
        &self,
        credential: &Credential,
        kind: TokenKind,
        now: i64,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.config.access_ttl_seconds,
            TokenKind::Refresh => self.config.refresh_ttl_seconds,
        };
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Signing(format!("{kind} token expiry overflows")))?;
        let claims = Claims {
            user_id: credential.id,
            username: credential.username.clone(),
            email: credential.email.clone(),
            kind,
            iss: self.config.issuer.clone(),
            sub: credential.username.clone(),
            iat: now,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }
}

fn check_lifetime(name: &'static str, seconds: i64) -> Result<(), ConfigError> {
    if seconds <= 0 {
        return Err(ConfigError::NonPositiveDuration { name });
    }
    if seconds > MAX_TTL_SECONDS {
        return Err(ConfigError::DurationTooLong {
            name,
            max: MAX_TTL_SECONDS,
        });
    }
    Ok(())
}
