use anyhow::Context;
use api_fanout::server;
use api_fanout::utils::{logger, validation::Validate};
use api_fanout::{FanoutEngine, ServerConfig};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    logger::init_server_logger(config.verbose, config.json_logs);

    config.validate().context("invalid server configuration")?;

    let engine = FanoutEngine::from_config(&config)
        .with_context(|| format!("failed to load catalog '{}'", config.catalog))?;

    let cors = server::cors_layer(&config.allow_origins).context("invalid CORS origins")?;
    if config.allow_origins.is_empty() {
        tracing::info!("CORS: any origin allowed");
    } else {
        tracing::info!("CORS: allowing {}", config.allow_origins.join(", "));
    }

    server::serve(Arc::new(engine), cors, &config.bind)
        .await
        .context("server stopped")?;

    Ok(())
}
