use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::contracts::IPancakeV2Router;
use super::{ConstantProductRouter, ExactTokensSwap};
use crate::chain::{ChainConnection, ChainResult, TransactionAuth, cancellable};

#[derive(Clone)]
pub struct AlloyV2Router {
    address: Address,
    connection: Arc<ChainConnection>,
}

impl AlloyV2Router {
    pub fn new(address: Address, connection: Arc<ChainConnection>) -> Self {
        Self {
            address,
            connection,
        }
    }
}

#[async_trait]
impl ConstantProductRouter for AlloyV2Router {
    fn address(&self) -> Address {
        self.address
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: &[Address],
        cancel: &CancellationToken,
    ) -> ChainResult<Vec<U256>> {
        let router = IPancakeV2Router::new(self.address, self.connection.provider().clone());
        let call = router.getAmountsOut(amount_in, path.to_vec());
        cancellable(cancel, async { call.call().await }).await
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        swap: &ExactTokensSwap,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        let input = IPancakeV2Router::swapExactTokensForTokensCall {
            amountIn: swap.amount_in,
            amountOutMin: swap.amount_out_min,
            path: swap.path.clone(),
            to: swap.to,
            deadline: U256::from(swap.deadline),
        }
        .abi_encode();
        self.connection
            .submit(auth, self.address, Bytes::from(input))
            .await
    }
}
