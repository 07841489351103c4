use crate::oauth::{DEFAULT_AUTH_URL, DEFAULT_TOKEN_URL, DEFAULT_USERINFO_URL};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_CLIENT_ID: &str = "client-id";
pub const ARG_CLIENT_SECRET: &str = "client-secret";
pub const ARG_REDIRECT_URL: &str = "redirect-url";
pub const ARG_AUTH_URL: &str = "auth-url";
pub const ARG_TOKEN_URL: &str = "token-url";
pub const ARG_USERINFO_URL: &str = "userinfo-url";
pub const ARG_SCOPES: &str = "scopes";
pub const ARG_PROVIDER_TIMEOUT_SECONDS: &str = "provider-timeout-seconds";

const DEFAULT_SCOPES: &str = concat!(
    "https://www.googleapis.com/auth/userinfo.email,",
    "https://www.googleapis.com/auth/userinfo.profile"
);

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CLIENT_ID)
                .long(ARG_CLIENT_ID)
                .help("OAuth client id registered with the identity provider")
                .env("AUTHGATE_CLIENT_ID"),
        )
        .arg(
            Arg::new(ARG_CLIENT_SECRET)
                .long(ARG_CLIENT_SECRET)
                .help("OAuth client secret")
                .env("AUTHGATE_CLIENT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_REDIRECT_URL)
                .long(ARG_REDIRECT_URL)
                .help("Callback URL registered with the identity provider")
                .env("AUTHGATE_REDIRECT_URL")
                .default_value("http://localhost:8080/auth/provider/callback"),
        )
        .arg(
            Arg::new(ARG_AUTH_URL)
                .long(ARG_AUTH_URL)
                .help("Provider authorization endpoint")
                .env("AUTHGATE_AUTH_URL")
                .default_value(DEFAULT_AUTH_URL),
        )
        .arg(
            Arg::new(ARG_TOKEN_URL)
                .long(ARG_TOKEN_URL)
                .help("Provider token endpoint")
                .env("AUTHGATE_TOKEN_URL")
                .default_value(DEFAULT_TOKEN_URL),
        )
        .arg(
            Arg::new(ARG_USERINFO_URL)
                .long(ARG_USERINFO_URL)
                .help("Provider profile endpoint")
                .env("AUTHGATE_USERINFO_URL")
                .default_value(DEFAULT_USERINFO_URL),
        )
        .arg(
            Arg::new(ARG_SCOPES)
                .long(ARG_SCOPES)
                .help("Comma separated scopes requested from the provider")
                .env("AUTHGATE_SCOPES")
                .default_value(DEFAULT_SCOPES),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT_SECONDS)
                .long(ARG_PROVIDER_TIMEOUT_SECONDS)
                .help("Timeout for each call to the provider, in seconds")
                .env("AUTHGATE_PROVIDER_TIMEOUT_SECONDS")
                .default_value("5")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_url: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub userinfo_url: Url,
    pub scopes: Vec<String>,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the client credentials are missing or a URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let get_url = |id: &str| -> Result<Url> {
            let raw = matches
                .get_one::<String>(id)
                .with_context(|| format!("missing required argument: --{id}"))?;
            Url::parse(raw).with_context(|| format!("invalid --{id}: {raw}"))
        };

        let client_id = get_non_empty(ARG_CLIENT_ID)
            .with_context(|| format!("missing required argument: --{ARG_CLIENT_ID}"))?;
        let client_secret = get_non_empty(ARG_CLIENT_SECRET)
            .map(SecretString::from)
            .with_context(|| format!("missing required argument: --{ARG_CLIENT_SECRET}"))?;

        let scopes = matches
            .get_one::<String>(ARG_SCOPES)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|scope| !scope.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            client_id,
            client_secret,
            redirect_url: get_url(ARG_REDIRECT_URL)?,
            auth_url: get_url(ARG_AUTH_URL)?,
            token_url: get_url(ARG_TOKEN_URL)?,
            userinfo_url: get_url(ARG_USERINFO_URL)?,
            scopes,
            timeout_seconds: matches
                .get_one::<u64>(ARG_PROVIDER_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(5),
        })
    }
}
