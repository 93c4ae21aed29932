//! 分发层：按 (dex, chain) 把请求交给启动时注册的编排器。

mod builder;
mod error;
mod wire;

#[cfg(test)]
mod tests;

pub use builder::build_orchestrators;
pub use error::{ServiceError, ServiceResult};
pub use wire::{ExecuteSwapRequest, GetQuoteRequest, WireQuote};

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chain::Network;
use crate::engine::{DexVersion, Quote, QuoteRequest, SwapOrchestrator, SwapRequest, SwapResult};

use self::wire::{parse_address, parse_amount, parse_chain, parse_dex};

pub struct QuoteSwapService {
    orchestrators: BTreeMap<(Network, DexVersion), Arc<SwapOrchestrator>>,
    default_recipient: Option<Address>,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

impl QuoteSwapService {
    pub fn new(
        orchestrators: BTreeMap<(Network, DexVersion), Arc<SwapOrchestrator>>,
        default_recipient: Option<Address>,
        shutdown: CancellationToken,
        request_timeout: Duration,
    ) -> Self {
        Self {
            orchestrators,
            default_recipient,
            shutdown,
            request_timeout,
        }
    }

    /// 已注册的 (chain, dex) 组合。
    pub fn routes(&self) -> Vec<(Network, DexVersion)> {
        self.orchestrators.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.orchestrators.is_empty()
    }

    /// 先校验 dex，再校验 chain。
    fn resolve(&self, dex: &str, chain: &str) -> ServiceResult<Arc<SwapOrchestrator>> {
        let dex = parse_dex(dex)?;
        let network = parse_chain(chain)?;
        self.orchestrators
            .get(&(network, dex))
            .cloned()
            .ok_or_else(|| ServiceError::UnknownChain(chain.to_string()))
    }

    pub async fn get_quote(&self, request: GetQuoteRequest) -> ServiceResult<Quote> {
        let orchestrator = self.resolve(&request.dex, &request.chain)?;
        let quote_request = QuoteRequest {
            token_in: parse_address("token_in", &request.token_in)?,
            token_out: parse_address("token_out", &request.token_out)?,
            amount: request.amount,
            slippage_bps: request.slippage_bps,
            network: orchestrator.network(),
            dex: orchestrator.dex(),
        };

        self.scoped("quote", |cancel| async move {
            orchestrator
                .quote(&quote_request, &cancel)
                .await
                .map_err(ServiceError::from)
        })
        .await
    }

    pub async fn execute_swap(&self, request: ExecuteSwapRequest) -> ServiceResult<SwapResult> {
        let wire = &request.quote;
        let orchestrator = self.resolve(&wire.dex, &wire.chain)?;
        let recipient = match request.recipient_address.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_address("recipient_address", raw)?,
            _ => self
                .default_recipient
                .ok_or_else(|| ServiceError::invalid("recipient address is required"))?,
        };

        let swap_request = SwapRequest {
            quote: Quote {
                token_in: parse_address("token_in", &wire.token_in)?,
                token_out: parse_address("token_out", &wire.token_out)?,
                amount_in: parse_amount("amount_in", &wire.amount_in)?,
                amount_out: parse_amount("amount_out", &wire.amount_out)?,
                slippage_bps: wire.slippage_bps,
                dex: orchestrator.dex(),
                chain: orchestrator.network(),
                fee_tier: wire.fee_tier,
            },
            recipient,
        };

        self.scoped("swap", |cancel| async move {
            orchestrator
                .swap(&swap_request, &cancel)
                .await
                .map_err(ServiceError::from)
        })
        .await
    }

    /// 每个请求一个取消域：进程关闭或超过 `request_timeout` 时取消，请求结束时回收。
    async fn scoped<F, Fut, T>(&self, operation: &'static str, run: F) -> ServiceResult<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        let request_id = Uuid::new_v4();
        let cancel = self.shutdown.child_token();
        let _scope = cancel.clone().drop_guard();

        let timer = cancel.clone();
        let timeout = self.request_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    info!(
                        target: "service",
                        %request_id,
                        operation,
                        timeout_ms = timeout.as_millis() as u64,
                        "请求超时，取消进行中的链上调用"
                    );
                    timer.cancel();
                }
            }
        });

        debug!(target: "service", %request_id, operation, "请求开始");
        let result = run(cancel).await;
        debug!(
            target: "service",
            %request_id,
            operation,
            ok = result.is_ok(),
            "请求结束"
        );
        result
    }
}
