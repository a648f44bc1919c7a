//! Main application wiring.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use relay_api::{create_router, run_server, ApiState, ExchangeInfo};
use relay_book::{ExpirySweeper, MemoryOrderStore, OrderBook, OrderStore, PgOrderStore};
use relay_chain::{EventReconciler, JsonRpcLogSource};
use relay_core::{Clock, SystemClock};
use relay_signer::SignatureVerifier;
use relay_validator::OrderValidator;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Relay application: shared book plus the tasks that serve and maintain it.
pub struct Application {
    config: AppConfig,
    book: OrderBook,
    state: ApiState,
    shutdown_token: CancellationToken,
}

impl Application {
    /// Connect storage and build shared state.
    ///
    /// Uses Postgres when `database.url` is set, otherwise an in-memory book.
    pub async fn build(config: AppConfig) -> AppResult<Self> {
        let store: Arc<dyn OrderStore> = match config.database.url.as_deref() {
            Some(url) => {
                let store = PgOrderStore::connect(url, config.database.max_connections).await?;
                store.bootstrap().await?;
                Arc::new(store)
            }
            None => {
                info!("No database configured, keeping the order book in memory");
                Arc::new(MemoryOrderStore::new())
            }
        };

        let app = Self::with_store(config, store, Arc::new(SystemClock));
        app.seed_tokens().await?;
        Ok(app)
    }

    /// Build over an existing store and clock.
    pub fn with_store(config: AppConfig, store: Arc<dyn OrderStore>, clock: Arc<dyn Clock>) -> Self {
        let book = OrderBook::new(store, clock.clone(), config.query.clone());
        let domain = &config.exchange.domain;
        let validator = OrderValidator::new(
            SignatureVerifier::new(domain.eip712()),
            clock,
            config.validation.clone(),
        );
        let exchange = ExchangeInfo::new(config.exchange.address, domain.clone());
        let state = ApiState::new(book.clone(), validator, exchange);

        Self {
            config,
            book,
            state,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Insert configured tokens into the verified-token table.
    pub async fn seed_tokens(&self) -> AppResult<()> {
        for token in &self.config.tokens {
            self.book.upsert_token(token.clone()).await?;
        }
        info!(count = self.config.tokens.len(), "Verified tokens seeded");
        Ok(())
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Token that stops every task when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    fn spawn_reconcilers(&self) -> AppResult<Vec<JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(self.config.chains.len());
        for chain in &self.config.chains {
            let source = JsonRpcLogSource::new(
                chain.rpc_url.clone(),
                Duration::from_millis(chain.request_timeout_ms),
            )?;
            let reconciler = EventReconciler::new(
                chain.clone(),
                Arc::new(source),
                self.book.clone(),
                self.shutdown_token.child_token(),
            );
            handles.push(tokio::spawn(reconciler.run()));
        }
        Ok(handles)
    }

    /// Run until ctrl-c or until the API server exits.
    pub async fn run(self) -> AppResult<()> {
        info!(
            chains = self.config.chains.len(),
            tokens = self.config.tokens.len(),
            "Starting relay"
        );

        let mut tasks = self.spawn_reconcilers()?;

        let sweeper = ExpirySweeper::new(
            self.book.clone(),
            &self.config.sweeper,
            self.shutdown_token.child_token(),
        );
        tasks.push(tokio::spawn(sweeper.run()));

        let state = self.state.clone();
        let api_config = self.config.api.clone();
        let server_token = self.shutdown_token.child_token();
        let mut server =
            tokio::spawn(async move { run_server(state, &api_config, server_token).await });

        let server_result = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                None
            }
            result = &mut server => Some(result),
        };

        self.shutdown_token.cancel();

        let server_result = match server_result {
            Some(result) => result,
            None => server.await,
        };
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Background task panicked");
            }
        }

        info!("Relay stopped");
        match server_result {
            Ok(result) => Ok(result?),
            Err(e) => Err(std::io::Error::other(e).into()),
        }
    }
}
