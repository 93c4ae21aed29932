//! 链连接层：网络枚举、节点 RPC 抽象、nonce 串行器与交易签名参数。

mod auth;
mod connection;
mod error;
mod network;
mod nonce;
mod registry;

pub use auth::TransactionAuth;
pub use connection::{ChainConnection, DIAL_TIMEOUT};
pub use error::{ChainError, ChainResult};
pub use network::{Network, UnknownNetwork};
pub use nonce::{NonceLease, NonceSequencer};
pub use registry::{ChainEndpoint, ChainRegistry};

use std::future::Future;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 已上链交易回执的摘要。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// 交易参数构建与回执轮询需要的节点级 RPC 能力。
#[async_trait]
pub trait ChainRpc: Send + Sync {
    fn network(&self) -> Network;

    async fn chain_id(&self, cancel: &CancellationToken) -> ChainResult<u64>;

    async fn pending_nonce(&self, account: Address, cancel: &CancellationToken)
    -> ChainResult<u64>;

    async fn suggest_tip_cap(&self, cancel: &CancellationToken) -> ChainResult<u128>;

    /// 最新区块头的 base fee；没有 base fee 的链返回 `None`。
    async fn latest_base_fee(&self, cancel: &CancellationToken) -> ChainResult<Option<u128>>;

    async fn receipt(
        &self,
        tx_hash: TxHash,
        cancel: &CancellationToken,
    ) -> ChainResult<Option<ReceiptSummary>>;
}

/// 在取消信号触发时提前返回 [`ChainError::Cancelled`]。
pub async fn cancellable<F, T, E>(cancel: &CancellationToken, fut: F) -> ChainResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ChainError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ChainError::Cancelled),
        result = fut => result.map_err(Into::into),
    }
}
