pub mod logging;
pub mod provider;
pub mod session;
pub mod token;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("authgate")
        .about("Delegated login and bearer token authentication service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = session::with_args(command);
    let command = provider::with_args(command);
    let command = token::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Delegated login and bearer token authentication service".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_port_from_env() {
        temp_env::with_vars([("AUTHGATE_PORT", Some("9443"))], || {
            let matches = new().get_matches_from(["authgate"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9443));
        });
    }

    #[test]
    fn test_port_flag_wins_over_env() {
        temp_env::with_vars([("AUTHGATE_PORT", Some("9443"))], || {
            let matches = new().get_matches_from(["authgate", "--port", "3000"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));
        });
    }

    #[test]
    fn test_invalid_port() {
        temp_env::with_vars([("AUTHGATE_PORT", None::<&str>)], || {
            let result = new().try_get_matches_from(["authgate", "--port", "70000"]);
            assert!(result.is_err());
        });
    }
}
