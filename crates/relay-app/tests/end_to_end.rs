//! Full application wiring over an in-memory store.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use relay_app::{AppConfig, Application};
use relay_book::{MemoryOrderStore, OrderStore};
use relay_core::{ManualClock, Order};
use relay_signer::OrderSigner;
use serde_json::{json, Value};
use tower::ServiceExt;

const NOW: u64 = 1_700_000_000;

fn config() -> AppConfig {
    AppConfig::from_toml(
        r#"
        [exchange]
        address = "0x4242424242424242424242424242424242424242"

        [[tokens]]
        address = "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"
        symbol = "WETH"
        name = "Wrapped Ether"
        decimals = 18

        [[tokens]]
        address = "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8"
        symbol = "USDC"
        name = "USD Coin"
        decimals = 6
        "#,
    )
    .unwrap()
}

fn token(config: &AppConfig, symbol: &str) -> Address {
    config
        .tokens
        .iter()
        .find(|t| t.symbol == symbol)
        .unwrap()
        .address
}

async fn app() -> (Application, Arc<MemoryOrderStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryOrderStore::new());
    let clock = Arc::new(ManualClock::new(NOW));
    let app = Application::with_store(config(), store.clone(), clock.clone());
    tokio_test::assert_ok!(app.seed_tokens().await);
    (app, store, clock)
}

async fn call(app: &Application, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/order")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn maker(config: &AppConfig) -> OrderSigner {
    loop {
        let bytes: [u8; 32] = rand::random();
        if let Ok(signer) = OrderSigner::from_bytes(&bytes, config.exchange.domain.eip712()) {
            return signer;
        }
    }
}

#[tokio::test]
async fn test_submit_duplicate_and_list() {
    let (app, store, _) = app().await;
    let config = config();
    let weth = token(&config, "WETH");
    let usdc = token(&config, "USDC");
    let signer = maker(&config);

    let order = Order {
        user: signer.address(),
        buy_token: usdc,
        sell_token: weth,
        buy_amount: U256::from(1_200_000_000u64),
        sell_amount: U256::from(10u64).pow(U256::from(18u64)),
        expiration_time_seconds: NOW + 600,
    };
    let signature = signer.sign_order(&order).await.unwrap();
    let body = json!({ "order": order, "signature": signature });

    let (status, first) = call(&app, post(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let hash = first["hash"].as_str().unwrap().to_string();

    let (status, dup) = call(&app, post(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(dup["err"].as_str().unwrap().contains("already exists"));
    assert_eq!(store.len(), 1);

    let (status, listed) = call(
        &app,
        get(&format!("/v1/orders?buyToken={usdc}&sellToken={weth}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["orders"][0]["hash"], hash);
    assert_eq!(listed["orders"][0]["signature"], signature);
}

#[tokio::test]
async fn test_markets_verified_from_seeded_tokens() {
    let (app, _, _) = app().await;
    let config = config();
    let weth = token(&config, "WETH");
    let usdc = token(&config, "USDC");
    let signer = maker(&config);

    let order = Order {
        user: signer.address(),
        buy_token: weth,
        sell_token: usdc,
        buy_amount: U256::from(1u64),
        sell_amount: U256::from(1_000u64),
        expiration_time_seconds: NOW + 60,
    };
    let signature = signer.sign_order(&order).await.unwrap();
    call(&app, post(json!({ "order": order, "signature": signature }))).await;

    let (status, body) = call(&app, get("/v1/markets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verifiedTokens"].as_array().unwrap().len(), 2);
    assert_eq!(body["markets"][0]["verified"], true);
    assert_eq!(
        body["exchange"]["exchangeAddress"],
        "0x4242424242424242424242424242424242424242"
    );
}

#[tokio::test]
async fn test_swept_orders_leave_listing() {
    let (app, store, clock) = app().await;
    let config = config();
    let weth = token(&config, "WETH");
    let usdc = token(&config, "USDC");
    let signer = maker(&config);

    let order = Order {
        user: signer.address(),
        buy_token: usdc,
        sell_token: weth,
        buy_amount: U256::from(5u64),
        sell_amount: U256::from(7u64),
        expiration_time_seconds: NOW + 10,
    };
    let signature = signer.sign_order(&order).await.unwrap();
    let (status, _) = call(&app, post(json!({ "order": order, "signature": signature }))).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(11);
    let now = app.book().now();
    assert_eq!(app.book().sweep_expired(now).await.unwrap(), 1);
    assert!(store.is_empty());
    assert_eq!(store.tokens().await.unwrap().len(), 2);

    let (_, body) = call(
        &app,
        get(&format!("/v1/user?address={}", signer.address())),
    )
    .await;
    assert!(body["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let (app, _, _) = app().await;

    let response = app.router().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}
