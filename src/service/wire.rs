use std::str::FromStr;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::chain::Network;
use crate::engine::{DexVersion, Quote};

use super::error::{ServiceError, ServiceResult};

/// `GetQuote` 入参；dex 与 chain 保留原始字符串，由分发层校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQuoteRequest {
    pub token_in: String,
    pub token_out: String,
    pub amount: u64,
    #[serde(default)]
    pub slippage_bps: u32,
    pub dex: String,
    pub chain: String,
}

/// 调用方回传的报价，数值字段原样交给成交流程。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireQuote {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    #[serde(default)]
    pub slippage_bps: u32,
    pub dex: String,
    pub chain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<u32>,
}

impl From<&Quote> for WireQuote {
    fn from(quote: &Quote) -> Self {
        Self {
            token_in: quote.token_in.to_string(),
            token_out: quote.token_out.to_string(),
            amount_in: quote.amount_in.to_string(),
            amount_out: quote.amount_out.to_string(),
            slippage_bps: quote.slippage_bps,
            dex: quote.dex.to_string(),
            chain: quote.chain.to_string(),
            fee_tier: quote.fee_tier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteSwapRequest {
    pub quote: WireQuote,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_address: Option<String>,
}

pub(crate) fn parse_dex(raw: &str) -> ServiceResult<DexVersion> {
    DexVersion::from_str(raw).map_err(|_| ServiceError::UnsupportedDex(raw.to_string()))
}

pub(crate) fn parse_chain(raw: &str) -> ServiceResult<Network> {
    Network::from_str(raw).map_err(|_| ServiceError::UnknownChain(raw.to_string()))
}

pub(crate) fn parse_address(field: &str, raw: &str) -> ServiceResult<Address> {
    Address::from_str(raw.trim())
        .map_err(|err| ServiceError::invalid(format!("{field} `{raw}` is not an address: {err}")))
}

pub(crate) fn parse_amount(field: &str, raw: &str) -> ServiceResult<U256> {
    U256::from_str(raw.trim())
        .map_err(|err| ServiceError::invalid(format!("{field} `{raw}` is not a uint256: {err}")))
}
