use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

use crate::chain::Network;
use crate::engine::{ApprovalPolicy, MinOutputPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteswapConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub chains: ChainsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "super::default_listen")]
    pub listen: String,
    /// 单个请求（含授权轮询）的最长耗时。
    #[serde(default = "super::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: super::default_listen(),
            request_timeout_ms: super::default_request_timeout_ms(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// 十六进制私钥，可由 `PRIVATE_KEY` 覆盖。
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub private_key: Zeroizing<String>,
    /// 拼接默认 RPC 地址用的 API key，可由 `API_KEY` 覆盖。
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Zeroizing<String>,
    /// 兑换请求未携带 recipient 时的收款地址。
    #[serde(default)]
    pub default_recipient: Option<Address>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &redacted(&self.private_key))
            .field("api_key", &redacted(&self.api_key))
            .field("default_recipient", &self.default_recipient)
            .finish()
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.trim().is_empty() { "<unset>" } else { "<redacted>" }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Zeroizing<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Zeroizing::new)
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "super::default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "super::default_deadline_secs")]
    pub deadline_secs: u64,
    /// v3 报价与成交时依次尝试的费率档位。
    #[serde(default = "super::default_fee_tiers")]
    pub fee_tiers: Vec<u32>,
    #[serde(default)]
    pub min_output: MinOutputPolicy,
    #[serde(default)]
    pub approval: ApprovalPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gas_limit: super::default_gas_limit(),
            deadline_secs: super::default_deadline_secs(),
            fee_tiers: super::default_fee_tiers(),
            min_output: MinOutputPolicy::default(),
            approval: ApprovalPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainsConfig {
    #[serde(default)]
    pub bsc: ChainConfig,
    #[serde(default)]
    pub eth: ChainConfig,
    #[serde(default)]
    pub base: ChainConfig,
}

impl ChainsConfig {
    pub fn get(&self, network: Network) -> &ChainConfig {
        match network {
            Network::Bsc => &self.bsc,
            Network::Eth => &self.eth,
            Network::Base => &self.base,
        }
    }

    pub fn get_mut(&mut self, network: Network) -> &mut ChainConfig {
        match network {
            Network::Bsc => &mut self.bsc,
            Network::Eth => &mut self.eth,
            Network::Base => &mut self.base,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "super::default_true")]
    pub enable: bool,
    /// 为空时使用默认前缀拼接 `wallet.api_key`。
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub v2_router: Option<Address>,
    #[serde(default)]
    pub v3_router: Option<Address>,
    #[serde(default)]
    pub v3_quoter: Option<Address>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            enable: true,
            rpc_url: String::new(),
            v2_router: None,
            v3_router: None,
            v3_quoter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingProfile {
    #[default]
    Lean,
    Verbose,
}

impl LoggingProfile {
    pub fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub profile: LoggingProfile,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: super::default_logging_level(),
            json: false,
            profile: LoggingProfile::default(),
            timezone_offset_hours: super::default_timezone_offset_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "super::default_prometheus_listen")]
    pub listen: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enable: false,
            listen: super::default_prometheus_listen(),
        }
    }
}
