//! Delegated-login endpoints (browser facing).
//!
//! Flow Overview: `/login/provider` stores a fresh anti-forgery state in a
//! cookie and redirects to the provider. The provider sends the browser back to
//! `/auth/provider/callback`, which consumes that cookie whatever the outcome,
//! resolves the identity and sets the session cookie. Failures never reveal
//! detail to the browser; they are logged and redirect home.

use axum::{
    extract::{Extension, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::IntoParams;

use super::{
    cookies::{clear_cookie, read_cookie, set_cookie, SESSION_COOKIE_NAME, STATE_COOKIE_NAME},
    state::AuthState,
    types::{ErrorBody, SessionUserResponse},
};
use crate::oauth::FlowError;

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/login/provider",
    responses(
        (status = 307, description = "Redirect to the identity provider; sets the state cookie"),
        (status = 500, description = "Login could not be started", body = ErrorBody)
    ),
    tag = "delegated"
)]
pub async fn login_provider(auth_state: Extension<Arc<AuthState>>) -> Response {
    let pending = match auth_state.flow().begin_login() {
        Ok(pending) => pending,
        Err(err) => {
            error!("Failed to start delegated login: {err}");
            return internal_error("Failed to start login");
        }
    };

    let cookie = match set_cookie(
        auth_state.config(),
        STATE_COOKIE_NAME,
        &pending.state,
        auth_state.config().state_ttl_seconds(),
    ) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build state cookie: {err}");
            return internal_error("Failed to start login");
        }
    };

    (
        [(SET_COOKIE, cookie)],
        Redirect::temporary(pending.redirect_url.as_str()),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/auth/provider/callback",
    responses(
        (status = 307, description = "Redirect home; sets the session cookie on success"),
        (status = 400, description = "State matched but no authorization code", body = ErrorBody)
    ),
    tag = "delegated"
)]
pub async fn callback(
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
    auth_state: Extension<Arc<AuthState>>,
) -> Response {
    if let Some(provider_error) = params.error.as_deref() {
        warn!(
            error = provider_error,
            description = params.error_description.as_deref().unwrap_or(""),
            "Identity provider returned an error"
        );
    }

    let stored_state = read_cookie(&headers, STATE_COOKIE_NAME);

    // The state cookie is single use.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_cookie(auth_state.config(), STATE_COOKIE_NAME) {
        response_headers.append(SET_COOKIE, cookie);
    }

    let result = auth_state
        .flow()
        .handle_callback(
            params.state.as_deref(),
            stored_state.as_deref(),
            params.code.as_deref(),
        )
        .await
        .and_then(|identity| auth_state.flow().create_session(identity));

    match result {
        Ok(session_id) => {
            match set_cookie(
                auth_state.config(),
                SESSION_COOKIE_NAME,
                &session_id,
                auth_state.config().session_ttl_seconds(),
            ) {
                Ok(cookie) => {
                    response_headers.append(SET_COOKIE, cookie);
                }
                Err(err) => {
                    error!("Failed to build session cookie: {err}");
                    auth_state.flow().end_session(&session_id);
                }
            }
            (response_headers, Redirect::temporary("/")).into_response()
        }
        Err(FlowError::MissingCode) => (
            StatusCode::BAD_REQUEST,
            response_headers,
            Json(ErrorBody::new("Code not found")),
        )
            .into_response(),
        Err(err) => {
            match &err {
                FlowError::StateMismatch => {}
                FlowError::Entropy(_) => error!("Failed to create session: {err}"),
                _ => error!("Delegated login failed: {err}"),
            }
            (response_headers, Redirect::temporary("/")).into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 307, description = "Session ended and cookies cleared")
    ),
    tag = "delegated"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    if let Some(session_id) = read_cookie(&headers, SESSION_COOKIE_NAME) {
        auth_state.flow().end_session(&session_id);
    }

    // Always clear the cookies, even if the session was already gone.
    let mut response_headers = HeaderMap::new();
    for name in [SESSION_COOKIE_NAME, STATE_COOKIE_NAME] {
        if let Ok(cookie) = clear_cookie(auth_state.config(), name) {
            response_headers.append(SET_COOKIE, cookie);
        }
    }

    (response_headers, Redirect::temporary("/")).into_response()
}

#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Identity bound to the session cookie",
            body = SessionUserResponse),
        (status = 401, description = "Not logged in or unknown session", body = ErrorBody)
    ),
    tag = "delegated"
)]
pub async fn api_user(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let Some(session_id) = read_cookie(&headers, SESSION_COOKIE_NAME) else {
        return (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Not logged in"))).into_response();
    };

    match auth_state.flow().session(&session_id) {
        Some(user) => (
            StatusCode::OK,
            Json(SessionUserResponse {
                success: true,
                user,
            }),
        )
            .into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(ErrorBody::new("Invalid session"))).into_response(),
    }
}

fn internal_error(message: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message))).into_response()
}
