//! Startup helpers for the terminal client.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use crate::assistant::ResearchAssistant;
use crate::cli::{self, Args};
use crate::client::{HttpBackend, ResearchBackend};
use crate::config::AssistantConfig;
use crate::persistence::{FileStore, Persistence};

/// Run the client (used by the `research-assistant` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` when the session ends normally, `1` on failure.
#[must_use]
pub fn run(args: &Args) -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Research Assistant v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run_session(args)) {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Build the session described by `config`.
///
/// # Errors
/// Returns an error if the backend URL is invalid or the data directory
/// cannot be opened.
pub fn build_assistant(config: &AssistantConfig, ephemeral: bool) -> anyhow::Result<ResearchAssistant> {
    let url = config.parsed_api_url()?;
    let backend: Arc<dyn ResearchBackend> = Arc::new(HttpBackend::new(url.as_str())?);
    tracing::info!("Backend endpoint: {url}");

    let persistence = if ephemeral {
        Persistence::in_memory()
    } else {
        let dir = config.resolved_data_dir()?;
        let store = FileStore::open(&dir)
            .with_context(|| format!("opening data directory {}", dir.display()))?;
        tracing::info!("Session data: {}", dir.display());
        Persistence::new(Arc::new(store))
    };

    Ok(ResearchAssistant::new(backend, persistence, config))
}

async fn run_session(args: &Args) -> anyhow::Result<()> {
    let config = args.to_config().context("loading configuration")?;
    let mut assistant = build_assistant(&config, args.ephemeral)?;

    match assistant.health().await {
        Ok(message) => tracing::info!("Backend says: {message}"),
        Err(e) => tracing::warn!("Backend not reachable yet: {e}"),
    }

    let mut stdout = std::io::stdout();
    cli::run_repl(&mut assistant, BufReader::new(tokio::io::stdin()), &mut stdout)
        .await
        .context("terminal I/O failed")
}
