use clap::{Arg, ArgAction, Command, builder::BoolishValueParser};

pub const ARG_PRODUCTION: &str = "production";
pub const ARG_STATIC_DIR: &str = "static-dir";
pub const ARG_UPLOADS_DIR: &str = "uploads-dir";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PRODUCTION)
                .long(ARG_PRODUCTION)
                .help("Serve the client bundle with a fallback to index.html")
                .env("IZZ_PRODUCTION")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_STATIC_DIR)
                .long(ARG_STATIC_DIR)
                .help("Directory holding the built client")
                .env("IZZ_STATIC_DIR")
                .default_value("client/build"),
        )
        .arg(
            Arg::new(ARG_UPLOADS_DIR)
                .long(ARG_UPLOADS_DIR)
                .help("Directory served under /uploads")
                .env("IZZ_UPLOADS_DIR")
                .default_value("uploads"),
        )
}
