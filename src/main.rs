use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use leaseguard::api::start_server;
use leaseguard::app_state::AppState;
use leaseguard::config::{self, Config};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cfg = Config::from_env();
    if cfg.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; every analysis will use the static fallback");
    }

    // Data files are required for any meaningful operation: refuse to
    // start without them.
    let state = match AppState::initialize(&cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let mut server = match start_server(state, addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Cannot bind API server");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Signal handler failed");
    }
    tracing::info!("Shutting down");
    server.shutdown();

    ExitCode::SUCCESS
}
