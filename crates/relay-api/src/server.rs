//! HTTP server implementation using axum.

use std::net::SocketAddr;

use axum::http::{header, HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::ApiState;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

/// Create the axum router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/order", post(handlers::submit_order))
        .route("/v1/orders", get(handlers::list_orders))
        .route("/v1/user", get(handlers::user_orders))
        .route("/v1/markets", get(handlers::markets))
        .route("/metrics", get(handlers::metrics))
        .route("/health", get(handlers::health))
        .layer(CompressionLayer::new())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown_token` is cancelled.
pub async fn run_server(
    state: ApiState,
    config: &ApiConfig,
    shutdown_token: CancellationToken,
) -> std::io::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Starting API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await?;

    info!("API server stopped");
    Ok(())
}
