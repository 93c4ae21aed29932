use thiserror::Error;

use crate::engine::{EngineError, SwapFailure, codes};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unsupported dex version: {0}")]
    UnsupportedDex(String),
    #[error("no service found for chain: {0}")]
    UnknownChain(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Approval(#[from] SwapFailure),
}

impl ServiceError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    pub fn code(&self) -> u32 {
        match self {
            ServiceError::UnsupportedDex(_)
            | ServiceError::UnknownChain(_)
            | ServiceError::InvalidRequest(_) => codes::INVALID_REQUEST,
            ServiceError::Engine(err) => err.code(),
            ServiceError::Approval(_) => codes::APPROVAL_FAILED,
        }
    }

    /// 客户端错误（不应重试）。
    pub fn is_client_error(&self) -> bool {
        self.code() == codes::INVALID_REQUEST
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
