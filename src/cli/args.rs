use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quoteswap", version, about = "PancakeSwap v2/v3 多链报价与兑换服务")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 quoteswap.toml 或 config/quoteswap.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 启动 HTTP 服务（默认命令）
    Serve,
    /// 单次报价并输出 JSON
    Quote(QuoteArgs),
    /// 按报价文件执行一次兑换
    Swap(SwapArgs),
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
pub struct QuoteArgs {
    #[arg(long, help = "网络：bsc / eth / base")]
    pub chain: String,
    #[arg(long, default_value = "v3", help = "协议版本：v2 / v3")]
    pub dex: String,
    #[arg(long, value_name = "ADDRESS")]
    pub token_in: String,
    #[arg(long, value_name = "ADDRESS")]
    pub token_out: String,
    #[arg(long, help = "卖出数量（最小单位）")]
    pub amount: u64,
    #[arg(long, default_value_t = 50u32, help = "滑点（基点）")]
    pub slippage_bps: u32,
    #[arg(long, value_name = "FILE", help = "同时把报价写入文件，供 swap 使用")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SwapArgs {
    #[arg(long, value_name = "FILE", help = "quote 命令输出的报价 JSON")]
    pub quote_path: PathBuf,
    #[arg(long, value_name = "ADDRESS", help = "收款地址，缺省使用配置中的 default_recipient")]
    pub recipient: Option<String>,
}

#[derive(Args, Debug)]
pub struct InitCmd {
    #[arg(long, value_name = "DIR", help = "可选输出目录（默认当前目录）")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}
