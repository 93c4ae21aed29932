use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::engine::{EngineError, SwapResult, codes};
use crate::service::ServiceError;

/// 所有接口共用的错误响应体。
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u32,
    pub message: String,
    /// 授权失败时附带的 FAILED 兑换结果。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SwapResult>,
}

impl ErrorResponse {
    pub fn new(error: &str, code: u32, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            code,
            message: message.into(),
            result: None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.to_string();
        let (status, body) = match self {
            ServiceError::UnsupportedDex(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("UNSUPPORTED_DEX", code, message),
            ),
            ServiceError::UnknownChain(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("UNKNOWN_CHAIN", code, message),
            ),
            ServiceError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_REQUEST", code, message),
            ),
            ServiceError::Approval(failure) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    result: Some(failure.result),
                    ..ErrorResponse::new("APPROVAL_FAILED", code, message)
                },
            ),
            ServiceError::Engine(err) => {
                let (status, error) = match &err {
                    EngineError::NoLiquidityFound { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "NO_LIQUIDITY")
                    }
                    EngineError::Cancelled => (StatusCode::GATEWAY_TIMEOUT, "CANCELLED"),
                    EngineError::Chain(_) => (StatusCode::BAD_GATEWAY, "CHAIN_ERROR"),
                    _ if code == codes::APPROVAL_FAILED => {
                        (StatusCode::BAD_GATEWAY, "APPROVAL_FAILED")
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
                };
                (status, ErrorResponse::new(error, code, message))
            }
        };
        (status, Json(body)).into_response()
    }
}
