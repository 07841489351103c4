use thiserror::Error;

/// Failures of a single delegated login attempt.
///
/// Messages may contain provider response details and are meant for logs,
/// never for the browser.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("state parameter does not match the stored anti-forgery token")]
    StateMismatch,
    #[error("authorization code missing from callback")]
    MissingCode,
    #[error("code exchange failed: {0}")]
    ExchangeFailed(String),
    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),
    #[error("profile parse failed: {0}")]
    ProfileParseFailed(String),
    #[error("random source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

/// Summarize a transport error without the request URL.
pub(super) fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_decode() {
        "malformed response body".to_string()
    } else if let Some(status) = err.status() {
        format!("unexpected status {status}")
    } else {
        "transport error".to_string()
    }
}
