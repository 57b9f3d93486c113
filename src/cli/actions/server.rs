use crate::{
    api::{self, EdgeConfig},
    firebase::{Config, FirebaseApp},
    identity::IdentityClient,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub firebase: Config,
    pub edge: EdgeConfig,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the Firebase client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let app = FirebaseApp::initialize(args.firebase).context("Failed to initialize Firebase")?;
    let identity = IdentityClient::new(Arc::new(app.auth()), Arc::new(app.firestore()));

    api::new(args.port, Arc::new(identity), args.edge).await
}

fn log_startup_args(args: &Args) {
    let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "unset".to_string());

    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("project_id", args.firebase.project_id.clone()),
        ("auth_domain", or_unset(&args.firebase.auth_domain)),
        ("storage_bucket", or_unset(&args.firebase.storage_bucket)),
        ("app_id", or_unset(&args.firebase.app_id)),
        ("identity_endpoint", args.firebase.identity_endpoint.clone()),
        ("firestore_endpoint", args.firebase.firestore_endpoint.clone()),
        ("production", args.edge.production.to_string()),
        ("static_dir", args.edge.static_dir.display().to_string()),
        ("uploads_dir", args.edge.uploads_dir.display().to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "izz {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
