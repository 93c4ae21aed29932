//! 兑换编排引擎：报价、授权、交易参数与 v2/v3 成交流程。

mod allowance;
mod concentrated;
mod constant_product;
mod error;
mod identity;
mod orchestrator;
mod params;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use allowance::{AllowanceManager, AllowanceOutcome, ApprovalPolicy};
pub use concentrated::ConcentratedOrchestrator;
pub use constant_product::ConstantProductOrchestrator;
pub use error::{EngineError, EngineResult};
pub use identity::SignerIdentity;
pub use orchestrator::{
    DEFAULT_DEADLINE_SECS, ExecutionSettings, SwapFailure, SwapOrchestrator, unix_deadline,
};
pub use params::{DEFAULT_GAS_LIMIT, TxParamsBuilder};
pub use types::{
    DEFAULT_FEE_TIERS, DexVersion, MinOutputPolicy, Quote, QuoteRequest, SwapErrorPayload,
    SwapRequest, SwapResult, SwapStatus, UnsupportedDex, codes, quoted_price, slippage_adjusted,
    u256_decimal,
};
