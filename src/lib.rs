pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod scheduling;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Failures that stop the server before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error("Failed to bind API server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Server entry point: logging, configuration, state, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = config::ServerConfig::from_env()?;
    let core = Arc::new(core_state::CoreState::open(
        &settings.db_path,
        settings.read_failure_policy,
    )?);

    let server = api::start_server(core, settings.bind).await?;
    tracing::info!(addr = %server.addr, "Scheduling API listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot listen for shutdown signal");
    }

    server.stop().await;
    Ok(())
}
