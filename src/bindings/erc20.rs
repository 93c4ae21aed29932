use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::Erc20Token;
use super::contracts::IERC20;
use crate::chain::{ChainConnection, ChainResult, TransactionAuth, cancellable};

#[derive(Clone)]
pub struct AlloyErc20 {
    connection: Arc<ChainConnection>,
}

impl AlloyErc20 {
    pub fn new(connection: Arc<ChainConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Erc20Token for AlloyErc20 {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        cancel: &CancellationToken,
    ) -> ChainResult<U256> {
        let contract = IERC20::new(token, self.connection.provider().clone());
        let call = contract.allowance(owner, spender);
        cancellable(cancel, async { call.call().await }).await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        let input = IERC20::approveCall { spender, amount }.abi_encode();
        self.connection
            .submit(auth, token, Bytes::from(input))
            .await
    }
}
