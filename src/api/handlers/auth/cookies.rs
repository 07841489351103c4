//! Minimal cookie helpers: `HttpOnly`, `SameSite=Lax`, path `/`.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};

use super::state::AuthConfig;

pub(crate) const STATE_COOKIE_NAME: &str = "authgate_oauth_state";
pub(crate) const SESSION_COOKIE_NAME: &str = "authgate_session";

/// Build a `Set-Cookie` value that lives for `max_age_seconds`.
pub(super) fn set_cookie(
    config: &AuthConfig,
    name: &str,
    value: &str,
    max_age_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if config.secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_cookie(
    config: &AuthConfig,
    name: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(config, name, "", 0)
}

/// First non-empty value of cookie `name` across all `Cookie` headers.
pub(crate) fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
        .find(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use url::Url;

    #[test]
    fn set_cookie_attributes() -> Result<()> {
        let config = AuthConfig::new(Url::parse("http://localhost:8080")?);
        let cookie = set_cookie(&config, SESSION_COOKIE_NAME, "abc", 60)?;
        assert_eq!(
            cookie.to_str()?,
            "authgate_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let config = AuthConfig::new(Url::parse("https://auth.example.com")?);
        let cookie = clear_cookie(&config, STATE_COOKIE_NAME)?;
        assert_eq!(
            cookie.to_str()?,
            "authgate_oauth_state=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure"
        );
        Ok(())
    }

    #[test]
    fn read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; authgate_session=s1"));
        headers.append(COOKIE, HeaderValue::from_static("authgate_oauth_state=st"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE_NAME).as_deref(), Some("s1"));
        assert_eq!(read_cookie(&headers, STATE_COOKIE_NAME).as_deref(), Some("st"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("authgate_session="));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE_NAME), None);
    }
}
