use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use url::Url;

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_STATE_TTL_SECONDS: &str = "state-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .long(ARG_BASE_URL)
                .help("Public base URL; cookies are marked Secure when it is https")
                .env("AUTHGATE_BASE_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie and server-side session TTL in seconds")
                .env("AUTHGATE_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_STATE_TTL_SECONDS)
                .long(ARG_STATE_TTL_SECONDS)
                .help("Anti-forgery state cookie TTL in seconds")
                .env("AUTHGATE_STATE_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub base_url: Url,
    pub session_ttl_seconds: i64,
    pub state_ttl_seconds: i64,
}

impl Options {
    /// Parse session and cookie arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let raw = matches
            .get_one::<String>(ARG_BASE_URL)
            .with_context(|| format!("missing required argument: --{ARG_BASE_URL}"))?;
        let base_url = Url::parse(raw).with_context(|| format!("invalid --{ARG_BASE_URL}: {raw}"))?;

        Ok(Self {
            base_url,
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            state_ttl_seconds: matches
                .get_one::<i64>(ARG_STATE_TTL_SECONDS)
                .copied()
                .unwrap_or(3_600),
        })
    }
}
