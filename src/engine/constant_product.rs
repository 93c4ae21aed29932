use std::sync::Arc;

use alloy::primitives::{TxHash, U256};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bindings::{ConstantProductRouter, ExactTokensSwap};
use crate::chain::Network;

use super::allowance::AllowanceManager;
use super::error::{EngineError, EngineResult};
use super::orchestrator::{ExecutionSettings, SwapFailure, unix_deadline};
use super::params::TxParamsBuilder;
use super::types::{DexVersion, Quote, QuoteRequest, SwapRequest, SwapResult, codes};

/// v2 路由：单次 `getAmountsOut` 报价，单笔 `swapExactTokensForTokens` 成交。
pub struct ConstantProductOrchestrator {
    network: Network,
    router: Arc<dyn ConstantProductRouter>,
    allowance: AllowanceManager,
    params: Arc<TxParamsBuilder>,
    settings: ExecutionSettings,
}

impl ConstantProductOrchestrator {
    pub fn new(
        network: Network,
        router: Arc<dyn ConstantProductRouter>,
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
        let path = [request.token_in, request.token_out];
        let amounts = self.router.get_amounts_out(amount_in, &path, cancel).await?;
        let amount_out = amounts
            .last()
            .copied()
            .ok_or(EngineError::NoLiquidityFound { last_error: None })?;

        Ok(Quote {
            token_in: request.token_in,
            token_out: request.token_out,
            amount_in,
            amount_out,
            slippage_bps: request.slippage_bps,
            dex: DexVersion::V2,
            chain: self.network,
            fee_tier: None,
        })
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

        match self.submit(request, amount_out_min, cancel).await {
            Ok(tx) => {
                info!(
                    target: "engine::swap",
                    network = %self.network,
                    dex = "v2",
                    tx = %tx,
                    amount_in = %quote.amount_in,
                    amount_out_min = %amount_out_min,
                    "兑换交易已广播"
                );
                Ok(SwapResult::pending(tx, quote, amount_out_min, None))
            }
            Err(err) => {
                warn!(
                    target: "engine::swap",
                    network = %self.network,
                    dex = "v2",
                    error = %err,
                    "兑换交易提交失败"
                );
                Ok(SwapResult::failed(codes::SWAP_FAILED, err.to_string(), quote))
            }
        }
    }

    async fn submit(
        &self,
        request: &SwapRequest,
        amount_out_min: U256,
        cancel: &CancellationToken,
    ) -> EngineResult<TxHash> {
        let auth = self.params.build(cancel).await?;
        let swap = ExactTokensSwap {
            amount_in: request.quote.amount_in,
            amount_out_min,
            path: vec![request.quote.token_in, request.quote.token_out],
            to: request.recipient,
            deadline: unix_deadline(self.settings.deadline_secs),
        };
        let tx = self.router.swap_exact_tokens_for_tokens(&swap, &auth).await?;
        auth.commit();
        Ok(tx)
    }
}
