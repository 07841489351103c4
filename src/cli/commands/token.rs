use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::token::MAX_TTL_SECONDS;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_JWT_ISSUER: &str = "jwt-issuer";
pub const ARG_ACCESS_TTL_SECONDS: &str = "access-ttl-seconds";
pub const ARG_REFRESH_TTL_SECONDS: &str = "refresh-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Shared secret used to sign and verify bearer tokens")
                .env("AUTHGATE_JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_JWT_ISSUER)
                .long(ARG_JWT_ISSUER)
                .help("Issuer claim written into and required from every token")
                .env("AUTHGATE_JWT_ISSUER")
                .default_value("authgate"),
        )
        .arg(
            Arg::new(ARG_ACCESS_TTL_SECONDS)
                .long(ARG_ACCESS_TTL_SECONDS)
                .help("Access token lifetime in seconds")
                .env("AUTHGATE_ACCESS_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TTL_SECONDS)
                .long(ARG_REFRESH_TTL_SECONDS)
                .help("Refresh token lifetime in seconds")
                .env("AUTHGATE_REFRESH_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL_SECONDS)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub issuer: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

impl Options {
    /// Parse token arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing or blank.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .map(SecretString::from)
            .with_context(|| format!("missing required argument: --{ARG_JWT_SECRET}"))?;

        Ok(Self {
            secret,
            issuer: matches
                .get_one::<String>(ARG_JWT_ISSUER)
                .cloned()
                .unwrap_or_else(|| "authgate".to_string()),
            access_ttl_seconds: matches
                .get_one::<i64>(ARG_ACCESS_TTL_SECONDS)
                .copied()
                .unwrap_or(900),
            refresh_ttl_seconds: matches
                .get_one::<i64>(ARG_REFRESH_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_ENV: [(&str, Option<&str>); 4] = [
        ("AUTHGATE_JWT_SECRET", None),
        ("AUTHGATE_JWT_ISSUER", None),
        ("AUTHGATE_ACCESS_TTL_SECONDS", None),
        ("AUTHGATE_REFRESH_TTL_SECONDS", None),
    ];

    #[test]
    fn parses_defaults() {
        temp_env::with_vars(TOKEN_ENV, || {
            let matches = with_args(Command::new("authgate"))
                .get_matches_from(["authgate", "--jwt-secret", "signing-key"]);
            let options = Options::parse(&matches);
            assert!(options.is_ok());
            if let Ok(options) = options {
                assert_eq!(options.issuer, "authgate");
                assert_eq!(options.access_ttl_seconds, 900);
                assert_eq!(options.refresh_ttl_seconds, 604_800);
            }
        });
    }

    #[test]
    fn secret_is_required() {
        temp_env::with_vars(TOKEN_ENV, || {
            let matches = with_args(Command::new("authgate")).get_matches_from(["authgate"]);
            let err = Options::parse(&matches).err().map(|e| e.to_string());
            assert_eq!(err.as_deref(), Some("missing required argument: --jwt-secret"));
        });
    }

    #[test]
    fn lifetimes_outside_bounds_are_rejected() {
        temp_env::with_vars(TOKEN_ENV, || {
            let too_long = (MAX_TTL_SECONDS + 1).to_string();
            for (arg, value) in [
                ("--access-ttl-seconds", "0"),
                ("--access-ttl-seconds", too_long.as_str()),
                ("--refresh-ttl-seconds", "-5"),
                ("--refresh-ttl-seconds", "9223372036854775807"),
            ] {
                let result = with_args(Command::new("authgate")).try_get_matches_from([
                    "authgate",
                    "--jwt-secret",
                    "signing-key",
                    arg,
                    value,
                ]);
                assert!(result.is_err(), "{arg} {value} should be rejected");
            }

            let max = MAX_TTL_SECONDS.to_string();
            let matches = with_args(Command::new("authgate")).try_get_matches_from([
                "authgate",
                "--jwt-secret",
                "signing-key",
                "--refresh-ttl-seconds",
                max.as_str(),
            ]);
            assert!(matches.is_ok());
        });
    }

    #[test]
    fn secret_is_not_printed() {
        temp_env::with_vars(TOKEN_ENV, || {
            let matches = with_args(Command::new("authgate"))
                .get_matches_from(["authgate", "--jwt-secret", "signing-key"]);
            let debug = Options::parse(&matches).map(|o| format!("{o:?}"));
            assert!(debug.is_ok_and(|d| !d.contains("signing-key")));
        });
    }
}
