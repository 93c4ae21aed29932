use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::Network;

/// 集中流动性费率档位，单位为百分之一基点；顺序即探测优先级。
pub const DEFAULT_FEE_TIERS: [u32; 4] = [500, 1_000, 3_000, 10_000];

pub const BPS_DENOMINATOR: u32 = 10_000;

/// 对外错误码。
pub mod codes {
    pub const APPROVAL_FAILED: u32 = 1;
    pub const INVALID_REQUEST: u32 = 3;
    pub const SWAP_FAILED: u32 = 5;
    pub const INTERNAL: u32 = 13;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexVersion {
    V2,
    V3,
}

impl DexVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DexVersion::V2 => "v2",
            DexVersion::V3 => "v3",
        }
    }
}

impl fmt::Display for DexVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedDex(pub String);

impl fmt::Display for UnsupportedDex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported dex version: {}", self.0)
    }
}

impl std::error::Error for UnsupportedDex {}

impl FromStr for DexVersion {
    type Err = UnsupportedDex;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v2" => Ok(DexVersion::V2),
            "v3" => Ok(DexVersion::V3),
            other => Err(UnsupportedDex(other.to_string())),
        }
    }
}

/// 执行时链上最小输出的取值方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinOutputPolicy {
    /// 直接使用报价的 amount_out。
    #[default]
    Quoted,
    /// 按报价携带的 slippage_bps 下调 amount_out。
    SlippageAdjusted,
}

impl MinOutputPolicy {
    pub fn min_output(&self, amount_out: U256, slippage_bps: u32) -> U256 {
        match self {
            MinOutputPolicy::Quoted => amount_out,
            MinOutputPolicy::SlippageAdjusted => slippage_adjusted(amount_out, slippage_bps),
        }
    }
}

pub fn slippage_adjusted(amount_out: U256, slippage_bps: u32) -> U256 {
    let bps = U256::from(slippage_bps.min(BPS_DENOMINATOR));
    let denominator = U256::from(BPS_DENOMINATOR);
    let slippage = match amount_out.checked_mul(bps) {
        Some(scaled) => scaled / denominator,
        None => amount_out / denominator * bps,
    };
    amount_out - slippage
}

/// 报价成交价 amount_out / amount_in；数值超出 Decimal 范围时返回 `None`。
pub fn quoted_price(amount_in: U256, amount_out: U256) -> Option<Decimal> {
    if amount_in.is_zero() {
        return None;
    }
    let amount_in = Decimal::from_str(&amount_in.to_string()).ok()?;
    let amount_out = Decimal::from_str(&amount_out.to_string()).ok()?;
    amount_out.checked_div(amount_in)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount: u64,
    pub slippage_bps: u32,
    pub network: Network,
    pub dex: DexVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub token_in: Address,
    pub token_out: Address,
    #[serde(with = "u256_decimal")]
    pub amount_in: U256,
    #[serde(with = "u256_decimal")]
    pub amount_out: U256,
    pub slippage_bps: u32,
    pub dex: DexVersion,
    pub chain: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub quote: Quote,
    pub recipient: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapErrorPayload {
    pub code: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    pub status: SwapStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SwapErrorPayload>,
    #[serde(with = "u256_decimal")]
    pub sell_token_qty: U256,
    #[serde(with = "u256_decimal")]
    pub amount_out_min: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<Decimal>,
}

impl SwapResult {
    pub fn pending(tx_hash: TxHash, quote: &Quote, amount_out_min: U256, fee_tier: Option<u32>) -> Self {
        Self {
            transaction_hash: Some(tx_hash),
            status: SwapStatus::Pending,
            error: None,
            sell_token_qty: quote.amount_in,
            amount_out_min,
            fee_tier,
            executed_price: quoted_price(quote.amount_in, quote.amount_out),
        }
    }

    pub fn failed(code: u32, message: impl Into<String>, quote: &Quote) -> Self {
        Self {
            transaction_hash: None,
            status: SwapStatus::Failed,
            error: Some(SwapErrorPayload {
                code,
                message: message.into(),
            }),
            sell_token_qty: quote.amount_in,
            amount_out_min: U256::ZERO,
            fee_tier: None,
            executed_price: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == SwapStatus::Pending
    }

    pub fn error_code(&self) -> Option<u32> {
        self.error.as_ref().map(|error| error.code)
    }
}

/// `U256` 以十进制字符串序列化，兼容 `0x` 十六进制输入。
pub mod u256_decimal {
    use std::str::FromStr;

    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        U256::from_str(raw.trim())
            .map_err(|err| de::Error::custom(format!("invalid uint256 `{raw}`: {err}")))
    }
}
