//! Seisdm Inspector - Main entry point.
//!
//! Loads a JSON configuration document into a scope, logs the change
//! notifications the load produces and prints the resulting object tree.
//!
//! Usage: `seisdm-inspector [DOCUMENT]` (falls back to `SEISDM_DOCUMENT`).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod document;
mod inspect;
mod printer;

use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seisdm_inspector=info,seisdm_datamodel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env(std::env::args().nth(1))?;
    tracing::info!(document = %config.document.display(), "Starting Seisdm Inspector");

    let report = inspect::run(&config).await?;

    print!("{}", report.tree);
    tracing::info!(
        objects = report.objects,
        registered = report.registered,
        notifications = report.notifications,
        "inspection complete"
    );
    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
