use anyhow::Context;
use clap::Parser;
use live_poll::utils::{logger, validation::Validate};
use live_poll::{PollServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting live-poll");
    if config.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let server = PollServer::bind(&config)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    server.run().await.context("Server stopped with an error")?;

    Ok(())
}
