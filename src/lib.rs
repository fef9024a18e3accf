pub mod api;
pub mod config;
pub mod core_state;
pub mod feedback;
pub mod models;
pub mod pipeline;
pub mod session;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::{CoreState, StartupError};

/// Start the service with the default configuration and block until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    run_with(AppConfig::default())
}

/// Build the services for `config` and serve the chat API.
pub fn run_with(config: AppConfig) -> Result<(), StartupError> {
    // The HTTP clients are blocking; build them outside the async runtime.
    let core = Arc::new(CoreState::bootstrap(&config)?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(core.clone(), config.listen_addr))?;
    drop(runtime);

    tracing::info!(
        sessions_discarded = core.session_count().unwrap_or(0),
        "{} stopped",
        config::APP_NAME
    );
    Ok(())
}
