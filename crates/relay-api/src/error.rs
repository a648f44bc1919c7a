//! API error type.
//!
//! Every error maps to `400 {"err": message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use relay_core::{BookError, QueryArgError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error(transparent)]
    Query(#[from] QueryArgError),

    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        warn!(error = %message, "Request failed");
        (StatusCode::BAD_REQUEST, Json(json!({ "err": message }))).into_response()
    }
}
