use axum::{
    Router,
    routing::{get, post},
    extract::{Query, State, Json},
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use crate::core::CurrencyService;
use crate::error::Error;
use crate::observability::metrics::gather_metrics;
use crate::types::Sample;
use crate::types::timestamp::parse_unix_secs;

pub struct ApiState {
    pub service: Arc<CurrencyService>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/currency/add", post(add_currency))
        .route("/currency/remove", post(remove_currency))
        .route("/currency/price", get(get_price))
        .route("/currency/tracked", get(list_tracked))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Error body `{"error": "..."}` with the matching status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        if err.is_invalid_input() {
            ApiError::bad_request(err.to_string())
        } else if err.is_not_found() {
            ApiError { status: StatusCode::NOT_FOUND, message: "not found".to_string() }
        } else {
            tracing::error!(error = %err, "request failed");
            ApiError { status: StatusCode::INTERNAL_SERVER_ERROR, message: "internal error".to_string() }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "bad request body");
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics() -> Result<Response, ApiError> {
    let body = gather_metrics()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

#[derive(Deserialize)]
struct AddRequest {
    #[serde(default)]
    symbol: String,
    /// Seconds between samples; zero or absent means the default period.
    #[serde(default)]
    period: i64,
}

#[derive(Deserialize)]
struct RemoveRequest {
    #[serde(default)]
    symbol: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

impl StatusResponse {
    fn ok() -> Json<Self> {
        Json(StatusResponse { status: "ok" })
    }
}

async fn add_currency(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = body?;
    if req.symbol.trim().is_empty() {
        return Err(ApiError::bad_request("symbol is required"));
    }

    state.service.add_currency(&req.symbol, req.period)?;
    Ok(StatusResponse::ok())
}

async fn remove_currency(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<RemoveRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(req) = body?;
    if req.symbol.trim().is_empty() {
        return Err(ApiError::bad_request("symbol is required"));
    }

    state.service.remove_currency(&req.symbol)?;
    Ok(StatusResponse::ok())
}

#[derive(Deserialize)]
struct PriceParams {
    symbol: Option<String>,
    timestamp: Option<String>,
}

#[derive(Serialize)]
struct PriceResponse {
    coin: String,
    timestamp: i64,
    /// Minor units (cents).
    price: i64,
}

impl From<Sample> for PriceResponse {
    fn from(sample: Sample) -> Self {
        PriceResponse {
            coin: sample.symbol,
            timestamp: sample.timestamp,
            price: sample.price.cents(),
        }
    }
}

async fn get_price(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PriceParams>,
) -> Result<Json<PriceResponse>, ApiError> {
    let symbol = params.symbol.unwrap_or_default();
    if symbol.trim().is_empty() {
        return Err(ApiError::bad_request("symbol is required"));
    }

    // An empty timestamp parameter means "now", same as omitting it.
    let ts = match params.timestamp.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_unix_secs(raw)?),
    };

    let sample = state.service.get_price(&symbol, ts).await?;
    Ok(Json(sample.into()))
}

#[derive(Serialize)]
struct TrackedResponse {
    symbols: Vec<String>,
}

async fn list_tracked(
    State(state): State<Arc<ApiState>>,
) -> Json<TrackedResponse> {
    Json(TrackedResponse {
        symbols: state.service.tracked_currencies(),
    })
}
