use alloy::transports::TransportError;
use thiserror::Error;

use super::network::Network;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("rpc request failed: {0}")]
    Rpc(#[from] TransportError),
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("contract call failed: {0}")]
    Call(String),
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] alloy::signers::Error),
    #[error("failed to connect {network} node: {reason}")]
    Connect { network: Network, reason: String },
    #[error("invalid rpc url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("block `{0}` not found")]
    MissingBlock(&'static str),
    #[error("request cancelled")]
    Cancelled,
}

impl ChainError {
    pub fn call(reason: impl std::fmt::Display) -> Self {
        Self::Call(reason.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChainError::Cancelled)
    }
}

pub type ChainResult<T> = Result<T, ChainError>;
