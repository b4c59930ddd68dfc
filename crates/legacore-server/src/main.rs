//! Legacore server entry point.

use std::process::ExitCode;

use legacore_server::config::load_config;
use legacore_server::error::ServerError;
use tracing_subscriber::EnvFilter;

async fn run() -> Result<(), ServerError> {
    let config = load_config()?;
    tracing::info!(
        environment = ?config.environment,
        tenant = %config.tenant_slug,
        "configuration loaded"
    );
    legacore_server::serve(config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("legacore=info")),
        )
        .json()
        .init();

    tracing::info!("Starting Legacore server...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Legacore server failed");
            ExitCode::FAILURE
        }
    }
}
