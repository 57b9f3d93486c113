pub mod edge;
pub mod firebase;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

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

    let command = Command::new("izz")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("IZZ_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = firebase::with_args(command);
    let command = edge::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [(&str, Option<&str>); 6] = [
        ("IZZ_PORT", None),
        ("IZZ_PRODUCTION", None),
        ("IZZ_STATIC_DIR", None),
        ("IZZ_UPLOADS_DIR", None),
        ("IZZ_LOG_LEVEL", None),
        ("IZZ_LOG_FORMAT", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "izz");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(CLEAR, || {
            let matches = new().get_matches_from(vec![
                "izz",
                "--firebase-api-key",
                "AIza-test",
                "--firebase-project-id",
                "izz-dev",
            ]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
            assert!(!matches.get_flag(edge::ARG_PRODUCTION));
            assert_eq!(
                matches.get_one::<String>(edge::ARG_STATIC_DIR).cloned(),
                Some("client/build".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(edge::ARG_UPLOADS_DIR).cloned(),
                Some("uploads".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<String>(firebase::ARG_IDENTITY_ENDPOINT)
                    .cloned(),
                Some(crate::firebase::DEFAULT_IDENTITY_ENDPOINT.to_string())
            );
            assert_eq!(
                matches.get_one::<String>(logging::ARG_LOG_FORMAT).cloned(),
                Some("pretty".to_string())
            );
            assert_eq!(
                matches.get_one::<String>(firebase::ARG_AUTH_DOMAIN),
                None
            );
        });
    }

    #[test]
    fn test_required_firebase_args() {
        temp_env::with_vars(
            [
                ("IZZ_FIREBASE_API_KEY", None::<&str>),
                ("IZZ_FIREBASE_PROJECT_ID", None),
            ],
            || {
                let result = new().try_get_matches_from(vec!["izz"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("IZZ_PORT", Some("443")),
                ("IZZ_FIREBASE_API_KEY", Some("AIza-env")),
                ("IZZ_FIREBASE_AUTH_DOMAIN", Some("izz.firebaseapp.com")),
                ("IZZ_FIREBASE_PROJECT_ID", Some("izz-prod")),
                ("IZZ_FIREBASE_APP_ID", Some("1:123:web:abc")),
                ("IZZ_PRODUCTION", Some("true")),
                ("IZZ_STATIC_DIR", Some("/srv/izz")),
                ("IZZ_LOG_LEVEL", Some("info")),
                ("IZZ_LOG_FORMAT", Some("json")),
            ],
            || {
                let matches = new().get_matches_from(vec!["izz"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(firebase::ARG_API_KEY).cloned(),
                    Some("AIza-env".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(firebase::ARG_AUTH_DOMAIN).cloned(),
                    Some("izz.firebaseapp.com".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(firebase::ARG_PROJECT_ID).cloned(),
                    Some("izz-prod".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(firebase::ARG_APP_ID).cloned(),
                    Some("1:123:web:abc".to_string())
                );
                assert!(matches.get_flag(edge::ARG_PRODUCTION));
                assert_eq!(
                    matches.get_one::<String>(edge::ARG_STATIC_DIR).cloned(),
                    Some("/srv/izz".to_string())
                );
                assert_eq!(matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(), Some(2));
                assert_eq!(
                    matches.get_one::<String>(logging::ARG_LOG_FORMAT).cloned(),
                    Some("json".to_string())
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("IZZ_LOG_LEVEL", Some(level)),
                    ("IZZ_FIREBASE_API_KEY", Some("AIza-env")),
                    ("IZZ_FIREBASE_PROJECT_ID", Some("izz-dev")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["izz"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("IZZ_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "izz".to_string(),
                    "--firebase-api-key".to_string(),
                    "AIza-test".to_string(),
                    "--firebase-project-id".to_string(),
                    "izz-dev".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let result = new().try_get_matches_from(vec![
            "izz",
            "--firebase-api-key",
            "AIza-test",
            "--firebase-project-id",
            "izz-dev",
            "--log-format",
            "xml",
        ]);
        assert!(result.is_err());
    }
}
