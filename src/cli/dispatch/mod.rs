use crate::{
    api::EdgeConfig,
    cli::{
        actions::{Action, server::Args},
        commands::{edge, firebase},
    },
    firebase::Config,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    Ok(Action::Server(Args {
        port,
        firebase: firebase_config(matches)?,
        edge: edge_config(matches),
    }))
}

fn firebase_config(matches: &clap::ArgMatches) -> Result<Config> {
    let optional = |id: &str| matches.get_one::<String>(id).cloned();

    let api_key = optional(firebase::ARG_API_KEY)
        .map(SecretString::from)
        .with_context(|| format!("missing required argument: --{}", firebase::ARG_API_KEY))?;
    let project_id = optional(firebase::ARG_PROJECT_ID)
        .with_context(|| format!("missing required argument: --{}", firebase::ARG_PROJECT_ID))?;

    let mut config = Config::new(api_key, project_id);
    config.auth_domain = optional(firebase::ARG_AUTH_DOMAIN);
    config.database_url = optional(firebase::ARG_DATABASE_URL);
    config.storage_bucket = optional(firebase::ARG_STORAGE_BUCKET);
    config.messaging_sender_id = optional(firebase::ARG_MESSAGING_SENDER_ID);
    config.app_id = optional(firebase::ARG_APP_ID);
    config.measurement_id = optional(firebase::ARG_MEASUREMENT_ID);
    if let Some(endpoint) = optional(firebase::ARG_IDENTITY_ENDPOINT) {
        config.identity_endpoint = endpoint;
    }
    if let Some(endpoint) = optional(firebase::ARG_FIRESTORE_ENDPOINT) {
        config.firestore_endpoint = endpoint;
    }

    Ok(config)
}

fn edge_config(matches: &clap::ArgMatches) -> EdgeConfig {
    let dir = |id: &str, default: &str| {
        matches
            .get_one::<String>(id)
            .map_or_else(|| PathBuf::from(default), PathBuf::from)
    };

    EdgeConfig {
        production: matches.get_flag(edge::ARG_PRODUCTION),
        static_dir: dir(edge::ARG_STATIC_DIR, "client/build"),
        uploads_dir: dir(edge::ARG_UPLOADS_DIR, "uploads"),
    }
}
