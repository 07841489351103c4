//! Bearer-token middleware for `/protected/*`.
//!
//! Only access tokens pass; the verified [`Claims`] are attached to the request
//! for the handlers behind it.

use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    error::AuthError,
    state::AuthState,
    types::{ApiResponse, MessageResponse, UserResponse},
};
use crate::token::Claims;

/// Parse `Bearer <token>`: exactly two space-separated parts, scheme
/// case-insensitive.
pub(super) fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

pub async fn require_bearer(
    auth_state: Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return AuthError::MissingAuthorization.into_response();
    };
    let Ok(value) = header.to_str() else {
        return AuthError::MalformedAuthorization.into_response();
    };
    let token = match parse_bearer(value) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    match auth_state.tokens().verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            debug!("Bearer token rejected: {err}");
            AuthError::InvalidToken(err).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/protected/user",
    responses(
        (status = 200, description = "Caller identity from the access token",
            body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing, malformed, invalid or non-access token",
            body = MessageResponse)
    ),
    security(("bearer" = [])),
    tag = "token"
)]
pub async fn protected_user(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(ApiResponse::ok(
        "User info retrieved",
        UserResponse {
            id: claims.user_id,
            username: claims.username,
            email: claims.email,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing() {
        assert_eq!(parse_bearer("Bearer abc").ok(), Some("abc"));
        assert_eq!(parse_bearer("bearer abc").ok(), Some("abc"));
        assert_eq!(parse_bearer("BEARER   abc ").ok(), Some("abc"));
        assert!(parse_bearer("Bearer").is_err());
        assert!(parse_bearer("Bearer a b").is_err());
        assert!(parse_bearer("Basic abc").is_err());
        assert!(parse_bearer("abc").is_err());
        assert!(parse_bearer("").is_err());
    }
}
