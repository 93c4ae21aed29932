use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use tokio_util::sync::CancellationToken;

use super::nonce::NonceLease;

/// 单笔待提交交易的签名与费用参数。每次提交都重新构建，不可复用。
pub struct TransactionAuth {
    pub signer: Arc<PrivateKeySigner>,
    pub from: Address,
    pub chain_id: u64,
    pub gas_tip_cap: u128,
    pub gas_fee_cap: u128,
    pub gas_limit: u64,
    pub value: U256,
    pub cancel: CancellationToken,
    lease: NonceLease,
}

impl TransactionAuth {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signer: Arc<PrivateKeySigner>,
        chain_id: u64,
        lease: NonceLease,
        gas_tip_cap: u128,
        gas_fee_cap: u128,
        gas_limit: u64,
        cancel: CancellationToken,
    ) -> Self {
        let from = signer.address();
        Self {
            signer,
            from,
            chain_id,
            gas_tip_cap,
            gas_fee_cap,
            gas_limit,
            value: U256::ZERO,
            cancel,
            lease,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.lease.nonce()
    }

    /// 交易已广播，记录 nonce 并释放串行锁。
    pub fn commit(self) {
        self.lease.commit();
    }
}

impl fmt::Debug for TransactionAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionAuth")
            .field("from", &self.from)
            .field("chain_id", &self.chain_id)
            .field("nonce", &self.nonce())
            .field("gas_tip_cap", &self.gas_tip_cap)
            .field("gas_fee_cap", &self.gas_fee_cap)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}
