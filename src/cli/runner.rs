use std::fs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::create_router;
use crate::chain::ChainRegistry;
use crate::cli::args::{Cli, Command, QuoteArgs, SwapArgs};
use crate::cli::context::{init_configs, init_tracing, load_configuration, shutdown_signal};
use crate::config::QuoteswapConfig;
use crate::engine::SignerIdentity;
use crate::service::{
    ExecuteSwapRequest, GetQuoteRequest, QuoteSwapService, ServiceError, WireQuote,
    build_orchestrators,
};

pub async fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Serve);
    if let Command::Init(args) = command {
        return init_configs(args);
    }

    let config = load_configuration(cli.config).map_err(|err| anyhow!(err))?;
    init_tracing(&config.logging)?;

    if let Some(addr) = crate::monitoring::init_prometheus(&config.prometheus)? {
        info!(target: "cli", %addr, "Prometheus 指标已启用");
    }

    let shutdown = CancellationToken::new();
    let service = Arc::new(bootstrap(&config, shutdown.clone()).await);

    match command {
        Command::Serve => serve(&config, service, shutdown).await,
        Command::Quote(args) => one_shot(shutdown, quote_once(&service, args)).await,
        Command::Swap(args) => one_shot(shutdown, swap_once(&service, args)).await,
        Command::Init(_) => Ok(()),
    }
}

/// 连接各网络节点并注册编排器；连接失败的网络被跳过。
async fn bootstrap(config: &QuoteswapConfig, shutdown: CancellationToken) -> QuoteSwapService {
    let identity = SignerIdentity::from_private_key(&config.wallet.private_key);
    match identity.address() {
        Some(address) => info!(target: "cli", signer = %address, "签名账户已加载"),
        None => warn!(target: "cli", "未配置有效私钥，兑换请求将失败"),
    }

    let endpoints = config.endpoints();
    if endpoints.is_empty() {
        warn!(target: "cli", "没有可用的 RPC 地址，请设置 rpc_url 或 API_KEY");
    }
    let registry = ChainRegistry::connect_all(&endpoints).await;
    let orchestrators = build_orchestrators(config, &registry, &identity);

    QuoteSwapService::new(
        orchestrators,
        config.wallet.default_recipient,
        shutdown,
        Duration::from_millis(config.server.request_timeout_ms),
    )
}

async fn serve(
    config: &QuoteswapConfig,
    service: Arc<QuoteSwapService>,
    shutdown: CancellationToken,
) -> Result<()> {
    if service.is_empty() {
        warn!(target: "cli", "没有任何已注册的网络，服务将只响应 /health");
    }

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;
    info!(
        target: "cli",
        listen = %config.server.listen,
        routes = service.routes().len(),
        "QuoteSwap 服务已启动"
    );

    let app = create_router(service);
    let token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            token.cancel();
        })
        .await
        .context("http server failed")?;

    shutdown.cancel();
    info!(target: "cli", "服务已停止");
    Ok(())
}

/// 单次命令：收到终止信号时取消进行中的请求。
async fn one_shot<F>(shutdown: CancellationToken, work: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let watcher = shutdown.clone();
    let signal_task = tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => watcher.cancel(),
            _ = watcher.cancelled() => {}
        }
    });
    let result = work.await;
    shutdown.cancel();
    let _ = signal_task.await;
    result
}

async fn quote_once(service: &QuoteSwapService, args: QuoteArgs) -> Result<()> {
    let quote = service
        .get_quote(GetQuoteRequest {
            token_in: args.token_in,
            token_out: args.token_out,
            amount: args.amount,
            slippage_bps: args.slippage_bps,
            dex: args.dex,
            chain: args.chain,
        })
        .await
        .map_err(|err| anyhow!(err))?;

    let rendered = serde_json::to_string_pretty(&WireQuote::from(&quote))?;
    if let Some(path) = args.output {
        fs::write(&path, &rendered)
            .with_context(|| format!("failed to write quote to {}", path.display()))?;
        info!(target: "cli", path = %path.display(), "报价已写入文件");
    }
    println!("{rendered}");
    Ok(())
}

async fn swap_once(service: &QuoteSwapService, args: SwapArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.quote_path)
        .with_context(|| format!("failed to read quote from {}", args.quote_path.display()))?;
    let quote: WireQuote = serde_json::from_str(&raw)
        .with_context(|| format!("invalid quote json in {}", args.quote_path.display()))?;

    let request = ExecuteSwapRequest {
        quote,
        recipient_address: args.recipient,
    };
    match service.execute_swap(request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(ServiceError::Approval(failure)) => {
            println!("{}", serde_json::to_string_pretty(&failure.result)?);
            Err(anyhow!(failure))
        }
        Err(err) => Err(anyhow!(err)),
    }
}
