use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 支持的 EVM 网络。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Bsc,
    Eth,
    Base,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Bsc, Network::Eth, Network::Base];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bsc => "bsc",
            Network::Eth => "eth",
            Network::Base => "base",
        }
    }

    /// Infura 风格的默认 RPC 前缀，启动时拼接 API key。
    pub fn default_rpc_prefix(&self) -> &'static str {
        match self {
            Network::Bsc => "https://bsc-mainnet.infura.io/v3/",
            Network::Eth => "https://mainnet.infura.io/v3/",
            Network::Base => "https://base-mainnet.infura.io/v3/",
        }
    }

    /// 覆盖 RPC 地址用的环境变量名，例如 `QUOTESWAP_BSC_RPC_URL`。
    pub fn rpc_env_var(&self) -> String {
        format!("QUOTESWAP_{}_RPC_URL", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNetwork(pub String);

impl fmt::Display for UnknownNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported chain: {}", self.0)
    }
}

impl std::error::Error for UnknownNetwork {}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bsc" => Ok(Network::Bsc),
            "eth" => Ok(Network::Eth),
            "base" => Ok(Network::Base),
            _ => Err(UnknownNetwork(value.to_string())),
        }
    }
}
