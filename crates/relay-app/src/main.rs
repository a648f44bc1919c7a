//! Order relay entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Off-chain order relay
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RELAY_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    relay_telemetry::init_logging()?;

    info!("Starting order relay v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > RELAY_CONFIG env var > default path (defaults if absent)
    let config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            relay_app::AppConfig::from_file(&path)?
        }
        None => relay_app::AppConfig::load()?,
    };
    info!(
        port = config.api.port,
        chains = config.chains.len(),
        persistent = config.database.url.is_some(),
        "Configuration loaded"
    );

    let app = relay_app::Application::build(config).await?;
    app.run().await?;

    Ok(())
}
