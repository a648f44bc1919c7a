//! Sign an order and print the `POST /v1/order` body.
//!
//! The private key is read from `RELAY_SIGNER_KEY` or from `--key-file`.

use std::path::PathBuf;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::Parser;
use relay_core::Order;
use relay_signer::{ExchangeDomain, KeySource, OrderSigner};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(version, about = "Sign a relay order with a local key", long_about = None)]
struct Args {
    /// Token the maker receives.
    #[arg(long)]
    buy_token: Address,
    /// Token the maker gives.
    #[arg(long)]
    sell_token: Address,
    /// Base-unit amount of the buy token.
    #[arg(long)]
    buy_amount: U256,
    /// Base-unit amount of the sell token.
    #[arg(long)]
    sell_amount: U256,
    /// Seconds from now until the order expires.
    #[arg(long, default_value_t = 3600)]
    ttl: u64,
    /// Key file (hex); defaults to the RELAY_SIGNER_KEY env var.
    #[arg(long)]
    key_file: Option<PathBuf>,
    /// Relay config providing the exchange domain.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let domain: ExchangeDomain = match &args.config {
        Some(path) => relay_app::AppConfig::from_file(path)?.exchange.domain,
        None => ExchangeDomain::default(),
    };

    let source = match args.key_file {
        Some(path) => KeySource::File { path },
        None => KeySource::EnvVar {
            var_name: "RELAY_SIGNER_KEY".to_string(),
        },
    };
    let signer = OrderSigner::load(&source, domain.eip712()).context("Failed to load key")?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .context("System clock before epoch")?
        .as_secs();

    let order = Order {
        user: signer.address(),
        buy_token: args.buy_token,
        sell_token: args.sell_token,
        buy_amount: args.buy_amount,
        sell_amount: args.sell_amount,
        expiration_time_seconds: now + args.ttl,
    };
    let signature = signer.sign_order(&order).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "order": order, "signature": signature }))?
    );
    Ok(())
}
