use alloy::primitives::TxHash;
use thiserror::Error;

use crate::chain::ChainError;

use super::types::codes;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("signing key is not configured")]
    MissingSigner,
    #[error("no liquidity found{}", last_error_suffix(.last_error))]
    NoLiquidityFound { last_error: Option<ChainError> },
    #[error(transparent)]
    Chain(ChainError),
    #[error("approval transaction {tx} reverted")]
    ApprovalReverted { tx: TxHash },
    #[error("approval transaction {tx} not confirmed after {attempts} polls")]
    ApprovalTimeout { tx: TxHash, attempts: u32 },
    #[error("request cancelled")]
    Cancelled,
}

fn last_error_suffix(last_error: &Option<ChainError>) -> String {
    match last_error {
        Some(err) => format!(": {err}"),
        None => String::new(),
    }
}

impl From<ChainError> for EngineError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Cancelled => EngineError::Cancelled,
            other => EngineError::Chain(other),
        }
    }
}

impl EngineError {
    pub fn is_approval_failure(&self) -> bool {
        matches!(
            self,
            EngineError::ApprovalReverted { .. } | EngineError::ApprovalTimeout { .. }
        )
    }

    /// 对外错误码：授权失败为 1，其余归为内部错误。
    pub fn code(&self) -> u32 {
        if self.is_approval_failure() {
            codes::APPROVAL_FAILED
        } else {
            codes::INTERNAL
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
