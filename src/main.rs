//! Product API - authenticated product catalogue service

use clap::Parser;
use product_api::{config::Config, logging, server::Server};
use std::path::PathBuf;
use tracing::info;

/// Product API - product catalogue REST service
#[derive(Parser, Debug)]
#[command(name = "product-api")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level)
        .to_lowercase();
    logging::init(&level, args.json_logs || config.logging.json)?;

    info!("Starting Product API v{}", product_api::VERSION);
    info!("Loaded configuration from {:?}", args.config);

    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
