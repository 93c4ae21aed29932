use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use crate::engine::{Quote, SwapResult, codes};
use crate::service::{ExecuteSwapRequest, GetQuoteRequest};

use super::AppState;
use super::response::ErrorResponse;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub routes: Vec<RouteInfo>,
}

#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub chain: String,
    pub dex: String,
}

/// GET /health - 列出已注册的 (chain, dex)
pub async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    let routes = service
        .routes()
        .into_iter()
        .map(|(chain, dex)| RouteInfo {
            chain: chain.to_string(),
            dex: dex.to_string(),
        })
        .collect::<Vec<_>>();
    let status = if routes.is_empty() { "degraded" } else { "ok" };
    Json(HealthResponse { status, routes })
}

/// POST /v1/quote
pub async fn post_quote(
    State(service): State<AppState>,
    payload: Result<Json<GetQuoteRequest>, JsonRejection>,
) -> Result<Json<Quote>, Response> {
    let Json(request) = payload.map_err(rejected)?;
    info!(
        target: "api",
        chain = %request.chain,
        dex = %request.dex,
        amount = request.amount,
        "收到报价请求"
    );
    service
        .get_quote(request)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

/// POST /v1/swap
pub async fn post_swap(
    State(service): State<AppState>,
    payload: Result<Json<ExecuteSwapRequest>, JsonRejection>,
) -> Result<Json<SwapResult>, Response> {
    let Json(request) = payload.map_err(rejected)?;
    info!(
        target: "api",
        chain = %request.quote.chain,
        dex = %request.quote.dex,
        amount_in = %request.quote.amount_in,
        "收到兑换请求"
    );
    service
        .execute_swap(request)
        .await
        .map(Json)
        .map_err(IntoResponse::into_response)
}

fn rejected(rejection: JsonRejection) -> Response {
    let body = ErrorResponse::new(
        "INVALID_REQUEST",
        codes::INVALID_REQUEST,
        rejection.body_text(),
    );
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
