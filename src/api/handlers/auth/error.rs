//! Error responses of the token endpoints and the bearer middleware.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::MessageResponse;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid request body")]
    InvalidRequestBody,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Failed to generate token")]
    TokenIssue,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Missing authorization header")]
    MissingAuthorization,
    #[error("Invalid authorization header format")]
    MalformedAuthorization,
    #[error("Invalid token: {0}")]
    InvalidToken(TokenError),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody => StatusCode::BAD_REQUEST,
            Self::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidCredentials
            | Self::InvalidRefreshToken
            | Self::UserNotFound
            | Self::MissingAuthorization
            | Self::MalformedAuthorization
            | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Map a refresh failure onto its response.
    pub(super) fn from_refresh(err: TokenError) -> Self {
        match err {
            TokenError::UserNotFound => Self::UserNotFound,
            TokenError::Signing(_) => Self::TokenIssue,
            _ => Self::InvalidRefreshToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = MessageResponse {
            success: false,
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(AuthError::InvalidRequestBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::TokenIssue.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AuthError::InvalidToken(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn token_reason_is_in_message() {
        assert_eq!(
            AuthError::InvalidToken(TokenError::Expired).to_string(),
            "Invalid token: token expired"
        );
    }

    #[test]
    fn refresh_mapping() {
        assert!(matches!(
            AuthError::from_refresh(TokenError::UserNotFound),
            AuthError::UserNotFound
        ));
        assert!(matches!(
            AuthError::from_refresh(TokenError::InvalidRefreshToken),
            AuthError::InvalidRefreshToken
        ));
        assert!(matches!(
            AuthError::from_refresh(TokenError::Signing("boom".to_string())),
            AuthError::TokenIssue
        ));
    }
}
