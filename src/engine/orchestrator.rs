use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::chain::Network;
use crate::monitoring::events;

use super::concentrated::ConcentratedOrchestrator;
use super::constant_product::ConstantProductOrchestrator;
use super::error::{EngineError, EngineResult};
use super::types::{
    DEFAULT_FEE_TIERS, DexVersion, MinOutputPolicy, Quote, QuoteRequest, SwapRequest, SwapResult,
    codes,
};

pub const DEFAULT_DEADLINE_SECS: u64 = 600;

/// 成交相关的可配置参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSettings {
    pub min_output: MinOutputPolicy,
    pub deadline_secs: u64,
    pub fee_tiers: Vec<u32>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            min_output: MinOutputPolicy::default(),
            deadline_secs: DEFAULT_DEADLINE_SECS,
            fee_tiers: DEFAULT_FEE_TIERS.to_vec(),
        }
    }
}

/// 授权阶段失败：调用方同时拿到 FAILED 结果与底层错误。
#[derive(Debug, Error)]
#[error("{source}")]
pub struct SwapFailure {
    pub result: SwapResult,
    pub source: EngineError,
}

impl SwapFailure {
    pub(crate) fn approval(source: EngineError, quote: &Quote) -> Self {
        Self {
            result: SwapResult::failed(codes::APPROVAL_FAILED, source.to_string(), quote),
            source,
        }
    }
}

/// 当前时间加 `secs` 秒的 unix 时间戳。
pub fn unix_deadline(secs: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO);
    now.as_secs().saturating_add(secs)
}

/// 每个 (network, dex) 在启动时选定一个实现，之后只读共享。
pub enum SwapOrchestrator {
    ConstantProduct(ConstantProductOrchestrator),
    Concentrated(ConcentratedOrchestrator),
}

impl SwapOrchestrator {
    pub fn dex(&self) -> DexVersion {
        match self {
            SwapOrchestrator::ConstantProduct(_) => DexVersion::V2,
            SwapOrchestrator::Concentrated(_) => DexVersion::V3,
        }
    }

    pub fn network(&self) -> Network {
        match self {
            SwapOrchestrator::ConstantProduct(inner) => inner.network(),
            SwapOrchestrator::Concentrated(inner) => inner.network(),
        }
    }

    pub async fn quote(
        &self,
        request: &QuoteRequest,
        cancel: &CancellationToken,
    ) -> EngineResult<Quote> {
        let started = Instant::now();
        let result = match self {
            SwapOrchestrator::ConstantProduct(inner) => inner.quote(request, cancel).await,
            SwapOrchestrator::Concentrated(inner) => inner.quote(request, cancel).await,
        };
        events::quote_outcome(self.network(), self.dex(), &result, started.elapsed());
        result
    }

    pub async fn swap(
        &self,
        request: &SwapRequest,
        cancel: &CancellationToken,
    ) -> Result<SwapResult, SwapFailure> {
        let result = match self {
            SwapOrchestrator::ConstantProduct(inner) => inner.swap(request, cancel).await,
            SwapOrchestrator::Concentrated(inner) => inner.swap(request, cancel).await,
        };
        let outcome = match &result {
            Ok(result) => result,
            Err(failure) => &failure.result,
        };
        events::swap_outcome(self.network(), self.dex(), outcome);
        result
    }
}
