use alloy::primitives::{Address, address};

use crate::chain::{ChainEndpoint, Network};
use crate::engine::{DEFAULT_DEADLINE_SECS, DEFAULT_FEE_TIERS, DEFAULT_GAS_LIMIT, ExecutionSettings};

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

/// PancakeSwap v3 SwapRouter，各网络部署地址相同。
pub const DEFAULT_V3_ROUTER: Address = address!("0x1b81D678ffb9C0263b24A97847620C99d213eB14");
/// PancakeSwap v3 QuoterV2，各网络部署地址相同。
pub const DEFAULT_V3_QUOTER: Address = address!("0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997");

pub fn default_v2_router(network: Network) -> Address {
    match network {
        Network::Bsc => address!("0x10ED43C718714eb63d5aA57B78B54704E256024E"),
        Network::Eth => address!("0xEfF92A263d31888d860bD50809A8D171709b7b1c"),
        Network::Base => address!("0x8cFe327CEc66d1C090Dd72bd0FF11d690C33a2Eb"),
    }
}

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_listen() -> String {
    "0.0.0.0:50051".to_string()
}

pub(crate) fn default_request_timeout_ms() -> u64 {
    300_000
}

pub(crate) fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

pub(crate) fn default_deadline_secs() -> u64 {
    DEFAULT_DEADLINE_SECS
}

pub(crate) fn default_fee_tiers() -> Vec<u32> {
    DEFAULT_FEE_TIERS.to_vec()
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    8
}

pub(crate) fn default_prometheus_listen() -> String {
    "0.0.0.0:9898".to_string()
}

impl ChainConfig {
    /// 显式配置的 RPC 地址优先，否则用默认前缀拼接 API key；两者都没有时返回 `None`。
    pub fn resolved_rpc_url(&self, network: Network, api_key: &str) -> Option<String> {
        let explicit = self.rpc_url.trim();
        if !explicit.is_empty() {
            return Some(explicit.to_string());
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(format!("{}{}", network.default_rpc_prefix(), api_key))
    }

    pub fn v2_router_or_default(&self, network: Network) -> Address {
        self.v2_router.unwrap_or_else(|| default_v2_router(network))
    }

    pub fn v3_router_or_default(&self) -> Address {
        self.v3_router.unwrap_or(DEFAULT_V3_ROUTER)
    }

    pub fn v3_quoter_or_default(&self) -> Address {
        self.v3_quoter.unwrap_or(DEFAULT_V3_QUOTER)
    }
}

impl QuoteswapConfig {
    /// 启用且能解析出 RPC 地址的网络。
    pub fn endpoints(&self) -> Vec<ChainEndpoint> {
        Network::ALL
            .iter()
            .filter_map(|&network| {
                let chain = self.chains.get(network);
                if !chain.enable {
                    return None;
                }
                chain
                    .resolved_rpc_url(network, &self.wallet.api_key)
                    .map(|rpc_url| ChainEndpoint { network, rpc_url })
            })
            .collect()
    }

    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            min_output: self.engine.min_output,
            deadline_secs: self.engine.deadline_secs,
            fee_tiers: self.engine.fee_tiers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_rpc_url_wins_over_api_key() {
        let chain = ChainConfig {
            rpc_url: " https://bsc.example/rpc ".to_string(),
            ..ChainConfig::default()
        };
        assert_eq!(
            chain.resolved_rpc_url(Network::Bsc, "key").as_deref(),
            Some("https://bsc.example/rpc")
        );
    }

    #[test]
    fn api_key_builds_default_url() {
        let chain = ChainConfig::default();
        assert_eq!(
            chain.resolved_rpc_url(Network::Base, "abc").as_deref(),
            Some("https://base-mainnet.infura.io/v3/abc")
        );
        assert_eq!(chain.resolved_rpc_url(Network::Base, ""), None);
    }

    #[test]
    fn router_defaults_follow_network() {
        let chain = ChainConfig::default();
        assert_eq!(
            chain.v2_router_or_default(Network::Bsc),
            address!("0x10ED43C718714eb63d5aA57B78B54704E256024E")
        );
        assert_eq!(chain.v3_router_or_default(), DEFAULT_V3_ROUTER);
        assert_eq!(chain.v3_quoter_or_default(), DEFAULT_V3_QUOTER);
    }

    #[test]
    fn disabled_or_unresolvable_chains_have_no_endpoint() {
        let mut config = QuoteswapConfig::default();
        config.chains.bsc.rpc_url = "https://bsc.example".to_string();
        config.chains.eth.enable = false;
        config.chains.eth.rpc_url = "https://eth.example".to_string();

        let endpoints = config.endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].network, Network::Bsc);
    }

    #[test]
    fn execution_settings_mirror_engine_section() {
        let config = QuoteswapConfig::default();
        let settings = config.execution_settings();
        assert_eq!(settings, ExecutionSettings::default());
    }
}
