use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bindings::Erc20Token;
use crate::chain::ChainError;
use crate::monitoring::events;

use super::error::{EngineError, EngineResult};
use super::params::TxParamsBuilder;

/// 授权交易回执的轮询策略：指数退避，间隔封顶，次数有限。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalPolicy {
    pub initial_interval_ms: u64,
    pub multiplier: u32,
    pub max_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: 3_000,
            multiplier: 2,
            max_interval_ms: 30_000,
            max_polls: 12,
        }
    }
}

impl ApprovalPolicy {
    /// 第 `poll` 次（从 0 开始）轮询前的等待时间。
    pub fn interval(&self, poll: u32) -> Duration {
        let factor = u64::from(self.multiplier.max(1)).saturating_pow(poll);
        let millis = self
            .initial_interval_ms
            .saturating_mul(factor)
            .min(self.max_interval_ms.max(self.initial_interval_ms));
        Duration::from_millis(millis)
    }

    /// 全部轮询间隔之和，即一次授权最长的等待时间。
    pub fn budget(&self) -> Duration {
        (0..self.max_polls).fold(Duration::ZERO, |total, poll| {
            total.saturating_add(self.interval(poll))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceOutcome {
    Sufficient,
    Approved { tx: TxHash },
}

pub struct AllowanceManager {
    token: Arc<dyn Erc20Token>,
    params: Arc<TxParamsBuilder>,
    policy: ApprovalPolicy,
}

impl AllowanceManager {
    pub fn new(
        token: Arc<dyn Erc20Token>,
        params: Arc<TxParamsBuilder>,
        policy: ApprovalPolicy,
    ) -> Self {
        Self {
            token,
            params,
            policy,
        }
    }

    /// 保证 `spender` 对 `owner` 的 `token` 授权额度不低于 `required`。
    /// 额度不足时提交一笔恰好为 `required` 的 approve 并等待其确认。
    pub async fn ensure(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        required: U256,
        cancel: &CancellationToken,
    ) -> EngineResult<AllowanceOutcome> {
        let current = self.token.allowance(token, owner, spender, cancel).await?;
        if current >= required {
            debug!(
                target: "engine::allowance",
                token = %token,
                spender = %spender,
                current = %current,
                required = %required,
                "授权额度充足"
            );
            return Ok(AllowanceOutcome::Sufficient);
        }

        let auth = self.params.build(cancel).await?;
        let tx = self.token.approve(token, spender, required, &auth).await?;
        auth.commit();
        info!(
            target: "engine::allowance",
            token = %token,
            spender = %spender,
            amount = %required,
            tx = %tx,
            "已提交授权交易"
        );

        let result = self.wait_for_receipt(tx, cancel).await;
        let outcome = match &result {
            Ok(_) => "confirmed",
            Err(EngineError::ApprovalReverted { .. }) => "reverted",
            Err(EngineError::ApprovalTimeout { .. }) => "timeout",
            Err(_) => "aborted",
        };
        events::approval_outcome(self.params.rpc().network(), &token, outcome);
        result.map(|_| AllowanceOutcome::Approved { tx })
    }

    async fn wait_for_receipt(&self, tx: TxHash, cancel: &CancellationToken) -> EngineResult<()> {
        let rpc = self.params.rpc();
        for poll in 0..self.policy.max_polls {
            let delay = self.policy.interval(poll);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(EngineError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }

            match rpc.receipt(tx, cancel).await {
                Ok(Some(receipt)) if receipt.success => {
                    info!(
                        target: "engine::allowance",
                        tx = %tx,
                        block = ?receipt.block_number,
                        polls = poll + 1,
                        "授权交易已确认"
                    );
                    return Ok(());
                }
                Ok(Some(_)) => return Err(EngineError::ApprovalReverted { tx }),
                Ok(None) => {
                    debug!(target: "engine::allowance", tx = %tx, poll, "授权交易尚未上链");
                }
                Err(ChainError::Cancelled) => return Err(EngineError::Cancelled),
                Err(err) => {
                    warn!(
                        target: "engine::allowance",
                        tx = %tx,
                        poll,
                        error = %err,
                        "查询授权回执失败，稍后重试"
                    );
                }
            }
        }

        Err(EngineError::ApprovalTimeout {
            tx,
            attempts: self.policy.max_polls,
        })
    }
}
