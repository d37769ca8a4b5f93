//! User segmentation API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p useg-api
//! ```
//!
//! Configuration is loaded from environment variables, `.env` and `.env.db`.

use anyhow::Context;
use tracing::{error, info};
use useg_common::{try_init_tracing_with_config, AppConfig, TracingConfig};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    // Initialize tracing
    let env = config.as_ref().map(|c| c.app.env).unwrap_or_default();
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    if let Err(e) = result {
        error!(error = ?e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        port = config.api.port,
        "Configuration loaded"
    );

    useg_api::run(config).await.context("Server error")?;

    Ok(())
}
