use std::sync::Arc;

use alloy::primitives::{TxHash, U256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bindings::{ConcentratedRouter, ExactInputSingle, encode_single_hop};
use crate::chain::{ChainError, Network};

use super::allowance::AllowanceManager;
use super::error::{EngineError, EngineResult};
use super::orchestrator::{ExecutionSettings, SwapFailure, unix_deadline};
use super::params::TxParamsBuilder;
use super::types::{DexVersion, Quote, QuoteRequest, SwapRequest, SwapResult, codes};

/// v3 路由：按费率档位顺序探测，第一个成功的档位即采用，不做比价。
pub struct ConcentratedOrchestrator {
    network: Network,
    router: Arc<dyn ConcentratedRouter>,
    allowance: AllowanceManager,
    params: Arc<TxParamsBuilder>,
    settings: ExecutionSettings,
}

impl ConcentratedOrchestrator {
    pub fn new(
        network: Network,
        router: Arc<dyn ConcentratedRouter>,
        allowance: AllowanceManager,
        params: Arc<TxParamsBuilder>,
        settings: ExecutionSettings,
    ) -> Self {
        Self {
            network,
            router,
            allowance,
            params,
            settings,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub async fn quote(
        &self,
        request: &QuoteRequest,
        cancel: &CancellationToken,
    ) -> EngineResult<Quote> {
        let amount_in = U256::from(request.amount);
        let mut last_error: Option<ChainError> = None;

        for &fee in &self.settings.fee_tiers {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let path = encode_single_hop(request.token_in, fee, request.token_out);
            match self.router.quote_exact_input(path, amount_in, cancel).await {
                Ok(amount_out) => {
                    debug!(
                        target: "engine::quote",
                        network = %self.network,
                        fee,
                        amount_out = %amount_out,
                        "费率档位报价成功"
                    );
                    return Ok(Quote {
                        token_in: request.token_in,
                        token_out: request.token_out,
                        amount_in,
                        amount_out,
                        slippage_bps: request.slippage_bps,
                        dex: DexVersion::V3,
                        chain: self.network,
                        fee_tier: Some(fee),
                    });
                }
                Err(ChainError::Cancelled) => return Err(EngineError::Cancelled),
                Err(err) => {
                    debug!(
                        target: "engine::quote",
                        network = %self.network,
                        fee,
                        error = %err,
                        "费率档位无可用报价"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(EngineError::NoLiquidityFound { last_error })
    }

    pub async fn swap(
        &self,
        request: &SwapRequest,
        cancel: &CancellationToken,
    ) -> Result<SwapResult, SwapFailure> {
        let quote = &request.quote;
        let owner = match self.params.identity().signer() {
            Ok(signer) => signer.address(),
            Err(err) => return Ok(SwapResult::failed(codes::INTERNAL, err.to_string(), quote)),
        };

        let spender = self.router.address();
        if let Err(err) = self
            .allowance
            .ensure(quote.token_in, owner, spender, quote.amount_in, cancel)
            .await
        {
            return Err(SwapFailure::approval(err, quote));
        }

        let amount_out_min = self
            .settings
            .min_output
            .min_output(quote.amount_out, quote.slippage_bps);

        let mut last_error: Option<EngineError> = None;
        for &fee in &self.settings.fee_tiers {
            match self.submit(request, fee, amount_out_min, cancel).await {
                Ok(tx) => {
                    info!(
                        target: "engine::swap",
                        network = %self.network,
                        dex = "v3",
                        fee,
                        tx = %tx,
                        amount_in = %quote.amount_in,
                        amount_out_min = %amount_out_min,
                        "兑换交易已广播"
                    );
                    return Ok(SwapResult::pending(tx, quote, amount_out_min, Some(fee)));
                }
                Err(EngineError::Cancelled) => {
                    last_error = Some(EngineError::Cancelled);
                    break;
                }
                Err(err) => {
                    warn!(
                        target: "engine::swap",
                        network = %self.network,
                        dex = "v3",
                        fee,
                        error = %err,
                        "费率档位提交失败，尝试下一档"
                    );
                    last_error = Some(err);
                }
            }
        }

        let message = match last_error {
            Some(err) => err.to_string(),
            None => "no fee tier configured".to_string(),
        };
        Ok(SwapResult::failed(codes::SWAP_FAILED, message, quote))
    }

    async fn submit(
        &self,
        request: &SwapRequest,
        fee: u32,
        amount_out_min: U256,
        cancel: &CancellationToken,
    ) -> EngineResult<TxHash> {
        let auth = self.params.build(cancel).await?;
        let swap = ExactInputSingle {
            token_in: request.quote.token_in,
            token_out: request.quote.token_out,
            fee,
            recipient: request.recipient,
            deadline: unix_deadline(self.settings.deadline_secs),
            amount_in: request.quote.amount_in,
            amount_out_minimum: amount_out_min,
            sqrt_price_limit_x96: U256::ZERO,
        };
        let tx = self.router.exact_input_single(&swap, &auth).await?;
        auth.commit();
        Ok(tx)
    }
}
