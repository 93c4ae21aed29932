//! 合约绑定适配层：只负责把调用编码后交给链连接，不含任何决策逻辑。

mod contracts;
mod erc20;
mod path;
mod v2;
mod v3;

pub use erc20::AlloyErc20;
pub use path::{SINGLE_HOP_PATH_LEN, encode_single_hop};
pub use v2::AlloyV2Router;
pub use v3::AlloyV3Router;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::chain::{ChainResult, TransactionAuth};

#[async_trait]
pub trait Erc20Token: Send + Sync {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        cancel: &CancellationToken,
    ) -> ChainResult<U256>;

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash>;
}

/// `swapExactTokensForTokens` 的调用参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactTokensSwap {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: u64,
}

/// 恒定乘积（v2）路由。
#[async_trait]
pub trait ConstantProductRouter: Send + Sync {
    fn address(&self) -> Address;

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: &[Address],
        cancel: &CancellationToken,
    ) -> ChainResult<Vec<U256>>;

    async fn swap_exact_tokens_for_tokens(
        &self,
        swap: &ExactTokensSwap,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash>;
}

/// `exactInputSingle` 的调用参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingle {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    pub sqrt_price_limit_x96: U256,
}

/// 集中流动性（v3）路由与报价合约。
#[async_trait]
pub trait ConcentratedRouter: Send + Sync {
    /// 路由合约地址，同时也是授权的 spender。
    fn address(&self) -> Address;

    async fn quote_exact_input(
        &self,
        path: Bytes,
        amount_in: U256,
        cancel: &CancellationToken,
    ) -> ChainResult<U256>;

    async fn exact_input_single(
        &self,
        swap: &ExactInputSingle,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash>;
}
