use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chain::{ChainRpc, NonceSequencer, TransactionAuth};

use super::error::EngineResult;
use super::identity::SignerIdentity;

pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

/// 为每一笔待提交交易构建 [`TransactionAuth`]。
pub struct TxParamsBuilder {
    rpc: Arc<dyn ChainRpc>,
    identity: SignerIdentity,
    nonces: Arc<NonceSequencer>,
    gas_limit: u64,
}

impl TxParamsBuilder {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        identity: SignerIdentity,
        nonces: Arc<NonceSequencer>,
        gas_limit: u64,
    ) -> Self {
        Self {
            rpc,
            identity,
            nonces,
            gas_limit,
        }
    }

    pub fn identity(&self) -> &SignerIdentity {
        &self.identity
    }

    pub fn rpc(&self) -> &Arc<dyn ChainRpc> {
        &self.rpc
    }

    /// 依次获取 chain id、签名者、nonce、小费与 base fee，任一步失败即中止。
    /// 返回的参数持有 nonce 锁，广播成功后需调用 [`TransactionAuth::commit`]。
    pub async fn build(&self, cancel: &CancellationToken) -> EngineResult<TransactionAuth> {
        let chain_id = self.rpc.chain_id(cancel).await?;
        let signer = self.identity.signer()?;
        let from = signer.address();

        let rpc = Arc::clone(&self.rpc);
        let lease = self
            .nonces
            .acquire(chain_id, from, cancel, || async move {
                rpc.pending_nonce(from, cancel).await
            })
            .await?;

        let tip_cap = self.rpc.suggest_tip_cap(cancel).await?;
        let base_fee = match self.rpc.latest_base_fee(cancel).await? {
            Some(base_fee) => base_fee,
            None => {
                warn!(
                    target: "engine::params",
                    network = %self.rpc.network(),
                    "最新区块缺少 base fee，按 0 处理"
                );
                0
            }
        };
        let fee_cap = base_fee.saturating_add(tip_cap);

        debug!(
            target: "engine::params",
            network = %self.rpc.network(),
            chain_id,
            from = %from,
            nonce = lease.nonce(),
            tip_cap,
            fee_cap,
            gas_limit = self.gas_limit,
            "交易参数已构建"
        );

        Ok(TransactionAuth::new(
            signer,
            chain_id,
            lease,
            tip_cap,
            fee_cap,
            self.gas_limit,
            cancel.clone(),
        ))
    }
}
