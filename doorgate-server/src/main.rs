//! doorgate server binary

use anyhow::Context;
use clap::Parser;
use doorgate_server::{AppState, DoorgateServer, LogFormat, ServerConfig};
use doorgate_store::StorageEngine;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, the environment may be set directly
    let _ = dotenvy::dotenv();

    let config = ServerConfig::parse();
    init_tracing(config.log_format);

    info!("Starting doorgate server");
    info!("Data directory: {}", config.data_dir.display());
    info!("Bind address: {}", config.bind);

    let auth_config = config.auth_config().context("invalid configuration")?;

    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
        info!("Created data directory: {}", config.data_dir.display());
    }

    let engine = StorageEngine::new(&config.data_dir).context("failed to open storage engine")?;
    let state = AppState::new(&auth_config, engine.users()?)?;
    info!("Storage engine initialized");

    DoorgateServer::new(state).serve(config.bind).await?;
    info!("Server shutdown gracefully");

    Ok(())
}
