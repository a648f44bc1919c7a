//! Route handlers.

use alloy::primitives::Address;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_core::{BookError, QueryArgError};
use relay_telemetry::Metrics;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::ApiState;
use crate::types::{
    MarketView, MarketsResponse, OrderView, OrdersQuery, OrdersResponse, SubmitOrderRequest,
    SubmitOrderResponse, TokenView, UserQuery,
};

fn parse_address(arg: &'static str, raw: &str) -> Result<Address, QueryArgError> {
    raw.trim()
        .to_lowercase()
        .parse::<Address>()
        .map_err(|e| QueryArgError::Invalid {
            arg,
            reason: format!("{raw:?} is not an address ({e})"),
        })
}

/// Comma-separated address list; empty segments are ignored.
fn parse_address_list(arg: &'static str, raw: Option<&str>) -> Result<Vec<Address>, QueryArgError> {
    let raw = raw.ok_or(QueryArgError::Missing(arg))?;
    let addresses = raw
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_address(arg, s))
        .collect::<Result<Vec<_>, _>>()?;

    if addresses.is_empty() {
        return Err(QueryArgError::Missing(arg));
    }
    Ok(addresses)
}

fn parse_epoch(arg: &'static str, raw: Option<&str>) -> Result<Option<u64>, QueryArgError> {
    raw.map(|s| {
        s.trim().parse::<u64>().map_err(|e| QueryArgError::Invalid {
            arg,
            reason: format!("{s:?} is not an epoch timestamp ({e})"),
        })
    })
    .transpose()
}

/// `POST /v1/order`
pub async fn submit_order(
    State(state): State<ApiState>,
    body: Result<Json<SubmitOrderRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitOrderResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let signed = state
        .validator
        .validate(request.order, request.signature.as_deref(), request.signer)
        .map_err(|e| {
            Metrics::order_rejected();
            e
        })?;
    let hash = signed.hash;

    match state.book.insert(signed).await {
        Ok(()) => {
            Metrics::order_accepted();
            info!(%hash, "Order accepted");
            Ok(Json(SubmitOrderResponse { hash }))
        }
        Err(e @ BookError::AlreadyExists) => {
            Metrics::order_duplicate();
            Err(e.into())
        }
        Err(e) => {
            Metrics::order_rejected();
            Err(e.into())
        }
    }
}

/// `GET /v1/orders?buyToken=..&sellToken=..&minExpires=..&maxExpires=..`
pub async fn list_orders(
    State(state): State<ApiState>,
    query: Result<Query<OrdersQuery>, QueryRejection>,
) -> ApiResult<Json<OrdersResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let buy_tokens = parse_address_list("buyToken", query.buy_token.as_deref())?;
    let sell_tokens = parse_address_list("sellToken", query.sell_token.as_deref())?;
    let min_expires = parse_epoch("minExpires", query.min_expires.as_deref())?;
    let max_expires = parse_epoch("maxExpires", query.max_expires.as_deref())?;

    let orders = state
        .book
        .query_by_side(&buy_tokens, &sell_tokens, min_expires, max_expires)
        .await?;

    Ok(Json(OrdersResponse {
        orders: orders
            .into_iter()
            .map(|o| OrderView::new(o, false))
            .collect(),
    }))
}

/// `GET /v1/user?address=..`
pub async fn user_orders(
    State(state): State<ApiState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<OrdersResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let raw = query
        .address
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(QueryArgError::Missing("address"))?;
    let user = parse_address("address", raw)?;

    let orders = state.book.query_by_user(user).await?;
    Ok(Json(OrdersResponse {
        orders: orders
            .into_iter()
            .map(|o| OrderView::new(o, true))
            .collect(),
    }))
}

/// `GET /v1/markets`
pub async fn markets(State(state): State<ApiState>) -> ApiResult<Json<MarketsResponse>> {
    let markets = state.book.markets().await?;
    let tokens = state.book.tokens().await?;

    Ok(Json(MarketsResponse {
        markets: markets.into_iter().map(MarketView::from).collect(),
        verified_tokens: tokens.into_iter().map(TokenView::from).collect(),
        exchange: state.exchange.clone(),
    }))
}

/// `GET /metrics` in the Prometheus text format.
pub async fn metrics() -> Response {
    match relay_telemetry::encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}
