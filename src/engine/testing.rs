//! 单元测试使用的链与合约替身，记录每一次调用。

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash, U256, address};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::bindings::{
    ConcentratedRouter, ConstantProductRouter, Erc20Token, ExactInputSingle, ExactTokensSwap,
};
use crate::chain::{
    ChainError, ChainResult, ChainRpc, Network, NonceSequencer, ReceiptSummary, TransactionAuth,
};

use super::allowance::ApprovalPolicy;
use super::identity::SignerIdentity;
use super::params::{DEFAULT_GAS_LIMIT, TxParamsBuilder};

pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const TOKEN_A: Address = address!("0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82");
pub const TOKEN_B: Address = address!("0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c");
pub const RECIPIENT: Address = Address::repeat_byte(0x42);
pub const V2_ROUTER: Address = Address::repeat_byte(0x02);
pub const V3_ROUTER: Address = Address::repeat_byte(0x03);

pub fn test_identity() -> SignerIdentity {
    match TEST_KEY.parse::<PrivateKeySigner>() {
        Ok(signer) => SignerIdentity::from_signer(signer),
        Err(err) => panic!("test key must parse: {err}"),
    }
}

pub fn fast_policy() -> ApprovalPolicy {
    ApprovalPolicy {
        initial_interval_ms: 1,
        multiplier: 2,
        max_interval_ms: 4,
        max_polls: 5,
    }
}

pub fn params_for(rpc: Arc<MockRpc>) -> TxParamsBuilder {
    TxParamsBuilder::new(
        rpc,
        test_identity(),
        Arc::new(NonceSequencer::new()),
        DEFAULT_GAS_LIMIT,
    )
}

struct RpcState {
    fail_chain_id: bool,
    pending_nonce: u64,
    tip: u128,
    base_fee: Option<u128>,
    tip_failures: VecDeque<String>,
    base_fee_failures: VecDeque<String>,
    receipts: VecDeque<Result<Option<ReceiptSummary>, String>>,
    nonce_reads: usize,
    receipt_polls: usize,
}

pub struct MockRpc {
    network: Network,
    chain_id: u64,
    state: Mutex<RpcState>,
}

impl MockRpc {
    pub fn new(chain_id: u64) -> Self {
        Self {
            network: Network::Bsc,
            chain_id,
            state: Mutex::new(RpcState {
                fail_chain_id: false,
                pending_nonce: 0,
                tip: 1_000_000_000,
                base_fee: Some(1_000_000_000),
                tip_failures: VecDeque::new(),
                base_fee_failures: VecDeque::new(),
                receipts: VecDeque::new(),
                nonce_reads: 0,
                receipt_polls: 0,
            }),
        }
    }

    pub fn fail_chain_id(&self) {
        self.state.lock().fail_chain_id = true;
    }

    pub fn set_pending_nonce(&self, nonce: u64) {
        self.state.lock().pending_nonce = nonce;
    }

    pub fn set_tip(&self, tip: u128) {
        self.state.lock().tip = tip;
    }

    pub fn set_base_fee(&self, base_fee: Option<u128>) {
        self.state.lock().base_fee = base_fee;
    }

    /// 下一次小费查询失败。
    pub fn fail_next_tip(&self, message: &str) {
        self.state.lock().tip_failures.push_back(message.to_string());
    }

    /// 下一次 base fee 查询失败。
    pub fn fail_next_base_fee(&self, message: &str) {
        self.state.lock().base_fee_failures.push_back(message.to_string());
    }

    pub fn push_receipt(&self, receipt: Option<ReceiptSummary>) {
        self.state.lock().receipts.push_back(Ok(receipt));
    }

    pub fn push_receipt_error(&self, message: &str) {
        self.state.lock().receipts.push_back(Err(message.to_string()));
    }

    pub fn nonce_reads(&self) -> usize {
        self.state.lock().nonce_reads
    }

    pub fn receipt_polls(&self) -> usize {
        self.state.lock().receipt_polls
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    fn network(&self) -> Network {
        self.network
    }

    async fn chain_id(&self, cancel: &CancellationToken) -> ChainResult<u64> {
        if cancel.is_cancelled() {
            return Err(ChainError::Cancelled);
        }
        if self.state.lock().fail_chain_id {
            return Err(ChainError::call("chain id unavailable"));
        }
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _account: Address, _cancel: &CancellationToken) -> ChainResult<u64> {
        let mut state = self.state.lock();
        state.nonce_reads += 1;
        Ok(state.pending_nonce)
    }

    async fn suggest_tip_cap(&self, _cancel: &CancellationToken) -> ChainResult<u128> {
        let mut state = self.state.lock();
        match state.tip_failures.pop_front() {
            Some(message) => Err(ChainError::call(message)),
            None => Ok(state.tip),
        }
    }

    async fn latest_base_fee(&self, _cancel: &CancellationToken) -> ChainResult<Option<u128>> {
        let mut state = self.state.lock();
        match state.base_fee_failures.pop_front() {
            Some(message) => Err(ChainError::call(message)),
            None => Ok(state.base_fee),
        }
    }

    async fn receipt(
        &self,
        _tx_hash: TxHash,
        cancel: &CancellationToken,
    ) -> ChainResult<Option<ReceiptSummary>> {
        if cancel.is_cancelled() {
            return Err(ChainError::Cancelled);
        }
        let mut state = self.state.lock();
        state.receipt_polls += 1;
        match state.receipts.pop_front() {
            Some(Ok(receipt)) => Ok(receipt),
            Some(Err(message)) => Err(ChainError::call(message)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedApproval {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    pub nonce: u64,
}

pub struct MockErc20 {
    allowance: Mutex<U256>,
    approvals: Mutex<Vec<RecordedApproval>>,
    allowance_reads: Mutex<Vec<(Address, Address, Address)>>,
}

impl MockErc20 {
    pub fn with_allowance(allowance: U256) -> Self {
        Self {
            allowance: Mutex::new(allowance),
            approvals: Mutex::new(Vec::new()),
            allowance_reads: Mutex::new(Vec::new()),
        }
    }

    pub fn approvals(&self) -> Vec<RecordedApproval> {
        self.approvals.lock().clone()
    }

    /// (token, owner, spender)
    pub fn allowance_reads(&self) -> Vec<(Address, Address, Address)> {
        self.allowance_reads.lock().clone()
    }
}

#[async_trait]
impl Erc20Token for MockErc20 {
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        _cancel: &CancellationToken,
    ) -> ChainResult<U256> {
        self.allowance_reads.lock().push((token, owner, spender));
        Ok(*self.allowance.lock())
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        self.approvals.lock().push(RecordedApproval {
            token,
            spender,
            amount,
            nonce: auth.nonce(),
        });
        Ok(TxHash::repeat_byte(0xaa))
    }
}

pub struct MockV2Router {
    amounts: Mutex<Result<Vec<U256>, String>>,
    swap_error: Mutex<Option<String>>,
    quote_calls: Mutex<Vec<(U256, Vec<Address>)>>,
    swaps: Mutex<Vec<(ExactTokensSwap, u64)>>,
}

impl MockV2Router {
    pub fn returning(amounts: Vec<U256>) -> Self {
        Self {
            amounts: Mutex::new(Ok(amounts)),
            swap_error: Mutex::new(None),
            quote_calls: Mutex::new(Vec::new()),
            swaps: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_quotes(message: &str) -> Self {
        let router = Self::returning(Vec::new());
        *router.amounts.lock() = Err(message.to_string());
        router
    }

    pub fn fail_swaps(&self, message: &str) {
        *self.swap_error.lock() = Some(message.to_string());
    }

    pub fn quote_calls(&self) -> Vec<(U256, Vec<Address>)> {
        self.quote_calls.lock().clone()
    }

    /// 每笔提交的参数与使用的 nonce。
    pub fn swaps(&self) -> Vec<(ExactTokensSwap, u64)> {
        self.swaps.lock().clone()
    }
}

#[async_trait]
impl ConstantProductRouter for MockV2Router {
    fn address(&self) -> Address {
        V2_ROUTER
    }

    async fn get_amounts_out(
        &self,
        amount_in: U256,
        path: &[Address],
        _cancel: &CancellationToken,
    ) -> ChainResult<Vec<U256>> {
        self.quote_calls.lock().push((amount_in, path.to_vec()));
        self.amounts.lock().clone().map_err(ChainError::call)
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        swap: &ExactTokensSwap,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        self.swaps.lock().push((swap.clone(), auth.nonce()));
        match self.swap_error.lock().clone() {
            Some(message) => Err(ChainError::call(message)),
            None => Ok(TxHash::repeat_byte(0xb2)),
        }
    }
}

pub struct MockV3Router {
    liquidity: BTreeMap<u32, U256>,
    accepting: Mutex<BTreeSet<u32>>,
    quoted_tiers: Mutex<Vec<u32>>,
    submissions: Mutex<Vec<(ExactInputSingle, u64)>>,
}

impl MockV3Router {
    /// `liquidity` 中的档位返回对应报价，其余档位报错。
    pub fn new(liquidity: impl IntoIterator<Item = (u32, U256)>) -> Self {
        Self {
            liquidity: liquidity.into_iter().collect(),
            accepting: Mutex::new(BTreeSet::new()),
            quoted_tiers: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// 仅这些档位的 `exactInputSingle` 提交成功。
    pub fn accept_swaps_on(&self, tiers: impl IntoIterator<Item = u32>) {
        self.accepting.lock().extend(tiers);
    }

    pub fn quoted_tiers(&self) -> Vec<u32> {
        self.quoted_tiers.lock().clone()
    }

    pub fn submissions(&self) -> Vec<(ExactInputSingle, u64)> {
        self.submissions.lock().clone()
    }

    pub fn tx_for(fee: u32) -> TxHash {
        let mut bytes = [0x33u8; 32];
        bytes[28..].copy_from_slice(&fee.to_be_bytes());
        TxHash::from(bytes)
    }
}

#[async_trait]
impl ConcentratedRouter for MockV3Router {
    fn address(&self) -> Address {
        V3_ROUTER
    }

    async fn quote_exact_input(
        &self,
        path: Bytes,
        _amount_in: U256,
        cancel: &CancellationToken,
    ) -> ChainResult<U256> {
        if cancel.is_cancelled() {
            return Err(ChainError::Cancelled);
        }
        let fee = u32::from_be_bytes([0, path[20], path[21], path[22]]);
        self.quoted_tiers.lock().push(fee);
        self.liquidity
            .get(&fee)
            .copied()
            .ok_or_else(|| ChainError::call(format!("no pool for fee {fee}")))
    }

    async fn exact_input_single(
        &self,
        swap: &ExactInputSingle,
        auth: &TransactionAuth,
    ) -> ChainResult<TxHash> {
        self.submissions.lock().push((swap.clone(), auth.nonce()));
        if self.accepting.lock().contains(&swap.fee) {
            Ok(Self::tx_for(swap.fee))
        } else {
            Err(ChainError::call(format!("fee {} rejected", swap.fee)))
        }
    }
}
