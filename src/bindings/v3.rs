use std::sync::Arc;

use alloy::primitives::aliases::{U24, U160};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::contracts::{IPancakeV3SwapRouter, IQuoterV2};
use super::{ConcentratedRouter, ExactInputSingle};
use crate::chain::{ChainConnection, ChainResult, TransactionAuth, cancellable};

#[derive(Clone)]
pub struct AlloyV3Router {
    router: Address,
    quoter: Address,
    connection: Arc<ChainConnection>,
}

impl AlloyV3Router {
    pub fn new(router: Address, quoter: Address, connection: Arc<ChainConnection>) -> Self {
        Self {
            router,
            quoter,
            connection,
        }
    }

    pub fn quoter(&self) -> Address {
        self.quoter
    }
}

#[async_trait]
impl ConcentratedRouter for AlloyV3Router {
    fn address(&self) -> Address {
        self.router
    }

    async fn quote_exact_input(
        &self,
        path: Bytes,
        amount_in: U256,
        cancel: &CancellationToken,
    ) -> ChainResult<U256> {
        let quoter = IQuoterV2::new(self.quoter, self.connection.provider().clone());
        let call = quoter.quoteExactInput(path, amount_in);
        let quoted = cancellable(cancel, async { call.call().await }).await?;
        Ok(quoted.amountOut)
    }

    async fn exact_input_single(
        &self,
        swap: &ExactInputSingle,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        let params = IPancakeV3SwapRouter::ExactInputSingleParams {
            tokenIn: swap.token_in,
            tokenOut: swap.token_out,
            fee: U24::from(swap.fee & 0x00ff_ffff),
            recipient: swap.recipient,
            deadline: U256::from(swap.deadline),
            amountIn: swap.amount_in,
            amountOutMinimum: swap.amount_out_minimum,
            sqrtPriceLimitX96: U160::saturating_from(swap.sqrt_price_limit_x96),
        };
        let input = IPancakeV3SwapRouter::exactInputSingleCall { params }.abi_encode();
        self.connection
            .submit(auth, self.router, Bytes::from(input))
            .await
    }
}
