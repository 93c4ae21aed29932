use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::chain::Network;

use super::QuoteswapConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["quoteswap.toml", "config/quoteswap.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 读取配置文件（未指定路径时依次尝试默认位置），再叠加进程环境变量。
pub fn load_config(path: Option<PathBuf>) -> Result<QuoteswapConfig, ConfigError> {
    let mut config = load_file_or_default(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate(&config)?;
    Ok(config)
}

fn load_file_or_default(path: Option<PathBuf>) -> Result<QuoteswapConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(QuoteswapConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<QuoteswapConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: QuoteswapConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config))
}

/// 环境变量覆盖：`PRIVATE_KEY`、`API_KEY`、`RECIPIENT_ADDRESS`、`PORT` 以及
/// 每个网络的 `QUOTESWAP_<NETWORK>_RPC_URL`。空值视为未设置。
pub fn apply_env_overrides<F>(config: &mut QuoteswapConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(key) = read("PRIVATE_KEY") {
        config.wallet.private_key = Zeroizing::new(key);
    }
    if let Some(key) = read("API_KEY") {
        config.wallet.api_key = Zeroizing::new(key);
    }
    if let Some(raw) = read("RECIPIENT_ADDRESS") {
        let recipient: Address = raw.trim().parse().map_err(|err| ConfigError::Env {
            name: "RECIPIENT_ADDRESS",
            reason: format!("{err}"),
        })?;
        config.wallet.default_recipient = Some(recipient);
    }
    if let Some(raw) = read("PORT") {
        let port: u16 = raw.trim().parse().map_err(|err| ConfigError::Env {
            name: "PORT",
            reason: format!("{err}"),
        })?;
        config.server.listen = with_port(&config.server.listen, port);
    }
    for network in Network::ALL {
        if let Some(url) = read(&network.rpc_env_var()) {
            config.chains.get_mut(network).rpc_url = url.trim().to_string();
        }
    }
    Ok(())
}

fn with_port(listen: &str, port: u16) -> String {
    let host = match listen.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    format!("{host}:{port}")
}

pub fn validate(config: &QuoteswapConfig) -> Result<(), ConfigError> {
    if config.engine.fee_tiers.is_empty() {
        return Err(ConfigError::Invalid {
            field: "engine.fee_tiers",
            reason: "at least one fee tier is required".to_string(),
        });
    }
    if let Some(fee) = config.engine.fee_tiers.iter().find(|fee| **fee > 0x00ff_ffff) {
        return Err(ConfigError::Invalid {
            field: "engine.fee_tiers",
            reason: format!("fee tier {fee} does not fit in 24 bits"),
        });
    }
    if config.engine.gas_limit == 0 {
        return Err(ConfigError::Invalid {
            field: "engine.gas_limit",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.engine.approval.max_polls == 0 {
        return Err(ConfigError::Invalid {
            field: "engine.approval.max_polls",
            reason: "must be greater than zero".to_string(),
        });
    }
    if config.server.request_timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            field: "server.request_timeout_ms",
            reason: "must be greater than zero".to_string(),
        });
    }
    let budget_ms = config.engine.approval.budget().as_millis();
    if budget_ms > u128::from(config.server.request_timeout_ms) {
        return Err(ConfigError::Invalid {
            field: "engine.approval",
            reason: format!(
                "approval polling budget {budget_ms} ms exceeds server.request_timeout_ms {}",
                config.server.request_timeout_ms
            ),
        });
    }
    Ok(())
}
