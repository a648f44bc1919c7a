//! Application configuration.

use std::path::Path;

use alloy::primitives::Address;
use relay_api::ApiConfig;
use relay_book::{QueryLimits, SweeperConfig};
use relay_chain::ChainConfig;
use relay_core::TokenInfo;
use relay_signer::ExchangeDomain;
use relay_validator::ValidationConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Settlement contract advertised to clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub domain: ExchangeDomain,
}

/// Postgres settings. Without a URL the book is kept in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub query: QueryLimits,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Chains whose settlement events are reconciled into the book.
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
    /// Verified tokens seeded into the book at startup.
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

impl AppConfig {
    /// Load from `RELAY_CONFIG` or `config/default.toml`, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("RELAY_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config.with_env_overrides())
    }

    /// `DATABASE_URL` takes precedence over the file.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database.url = Some(url);
            }
        }
        self
    }

    fn validate(&self) -> AppResult<()> {
        let mut names = std::collections::HashSet::new();
        for chain in &self.chains {
            if !names.insert(chain.name.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate chain name: {}",
                    chain.name
                )));
            }
            if chain.poll_interval_ms == 0 {
                return Err(AppError::Config(format!(
                    "Chain {}: poll_interval_ms must be positive",
                    chain.name
                )));
            }
        }
        if self.sweeper.interval_ms == 0 {
            return Err(AppError::Config(
                "sweeper.interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
