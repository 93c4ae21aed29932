use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use once_cell::sync::OnceCell;

use crate::config::PrometheusConfig;

pub const QUOTE_TOTAL: &str = "quoteswap_quote_total";
pub const QUOTE_LATENCY_MS: &str = "quoteswap_quote_latency_ms";
pub const SWAP_TOTAL: &str = "quoteswap_swap_total";
pub const APPROVAL_TOTAL: &str = "quoteswap_approval_total";

/// 报价耗时分桶（毫秒），覆盖单档 RPC 到四档全部失败。
const QUOTE_LATENCY_BUCKETS: &[f64] = &[
    25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 15_000.0,
];

static EXPORTER: OnceCell<SocketAddr> = OnceCell::new();

/// 按配置安装 Prometheus 导出器。未启用时返回 `Ok(None)`；
/// 已安装过则直接返回首次监听的地址。
pub fn init_prometheus(config: &PrometheusConfig) -> Result<Option<SocketAddr>> {
    if !config.enable {
        return Ok(None);
    }
    EXPORTER
        .get_or_try_init(|| install(&config.listen))
        .map(|addr| Some(*addr))
}

fn install(listen: &str) -> Result<SocketAddr> {
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid prometheus listen address: {listen}"))?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Full(QUOTE_LATENCY_MS.to_string()), QUOTE_LATENCY_BUCKETS)
        .context("invalid quote latency buckets")?
        .install()
        .context("failed to install prometheus exporter")?;
    describe();
    Ok(addr)
}

fn describe() {
    describe_counter!(QUOTE_TOTAL, Unit::Count, "quotes served, by network, dex and result");
    describe_histogram!(QUOTE_LATENCY_MS, Unit::Milliseconds, "quote latency including fee tier probing");
    describe_counter!(SWAP_TOTAL, Unit::Count, "swap executions, by network, dex and status");
    describe_counter!(APPROVAL_TOTAL, Unit::Count, "allowance checks, by network and outcome");
}

pub fn prometheus_enabled() -> bool {
    EXPORTER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_installs_nothing() {
        let config = PrometheusConfig {
            enable: false,
            listen: "not-an-address".to_string(),
        };
        assert_eq!(init_prometheus(&config).unwrap(), None);
        assert!(!prometheus_enabled());
    }

    #[test]
    fn rejects_malformed_listen_address() {
        let config = PrometheusConfig {
            enable: true,
            listen: "not-an-address".to_string(),
        };
        let err = init_prometheus(&config).unwrap_err();
        assert!(err.to_string().contains("invalid prometheus listen address"));
        assert!(!prometheus_enabled());
    }
}
