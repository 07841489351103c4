use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::auth::{
    cookies::{read_cookie, SESSION_COOKIE_NAME},
    types::RootResponse,
    AuthState,
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Session status of the caller", body = RootResponse)
    ),
    tag = "delegated"
)]
pub async fn root(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let user = read_cookie(&headers, SESSION_COOKIE_NAME)
        .and_then(|session_id| auth_state.flow().session(&session_id));

    let response = match user {
        Some(user) => RootResponse {
            authenticated: true,
            user: Some(user),
            login_url: None,
        },
        None => RootResponse {
            authenticated: false,
            user: None,
            login_url: Some("/login/provider".to_string()),
        },
    };

    Json(response)
}
