//! Username/password login and refresh-token rotation.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{
    error::AuthError,
    state::AuthState,
    types::{ApiResponse, LoginRequest, MessageResponse, RefreshRequest},
};
use crate::token::{TokenError, TokenPair};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token pair issued", body = ApiResponse<TokenPair>),
        (status = 400, description = "Missing or malformed fields", body = MessageResponse),
        (status = 401, description = "Invalid username or password", body = MessageResponse),
        (status = 500, description = "Token could not be signed", body = MessageResponse)
    ),
    tag = "token"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected login body: {rejection}");
        AuthError::InvalidRequestBody
    })?;
    if request.username.is_empty() || request.password.is_empty() {
        return Err(AuthError::InvalidRequestBody);
    }

    let credential = auth_state
        .credentials()
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|_| {
            info!("Password login rejected");
            AuthError::InvalidCredentials
        })?;

    let pair = auth_state
        .tokens()
        .issue_token_pair(&credential)
        .map_err(|err| {
            error!("Failed to issue token pair: {err}");
            AuthError::TokenIssue
        })?;

    info!(user_id = credential.id, "Password login succeeded");

    Ok(Json(ApiResponse::ok("Login successful", pair)))
}

#[utoipa::path(
    post,
    path = "/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Both tokens rotated", body = ApiResponse<TokenPair>),
        (status = 400, description = "Missing or malformed fields", body = MessageResponse),
        (status = 401, description = "Invalid refresh token or unknown user",
            body = MessageResponse)
    ),
    tag = "token"
)]
pub async fn refresh(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload.map_err(|_| AuthError::InvalidRequestBody)?;
    if request.refresh_token.is_empty() {
        return Err(AuthError::InvalidRequestBody);
    }

    let pair = auth_state
        .tokens()
        .refresh_token_pair(&request.refresh_token)
        .map_err(|err| {
            if matches!(err, TokenError::Signing(_)) {
                error!("Failed to issue token pair: {err}");
            }
            AuthError::from_refresh(err)
        })?;

    Ok(Json(ApiResponse::ok("Token refreshed", pair)))
}
