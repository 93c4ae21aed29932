use std::future::IntoFuture;
use std::time::Duration;

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::BlockNumberOrTag;
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::signers::SignerSync;
use alloy::transports::http::Http;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::auth::TransactionAuth;
use super::error::{ChainError, ChainResult};
use super::network::Network;
use super::{ChainRpc, ReceiptSummary, cancellable};

/// 启动阶段连接节点的超时时间。
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(15);
const RPC_TIMEOUT: Duration = Duration::from_secs(20);
const RPC_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// 绑定单个网络的 RPC 会话，进程生命周期内只创建一次。
#[derive(Clone)]
pub struct ChainConnection {
    network: Network,
    endpoint: String,
    provider: RootProvider,
}

impl ChainConnection {
    pub fn new(network: Network, rpc_url: &str) -> ChainResult<Self> {
        let url: Url = rpc_url.trim().parse().map_err(|err: url::ParseError| {
            ChainError::InvalidUrl {
                url: redact(rpc_url),
                reason: err.to_string(),
            }
        })?;
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .connect_timeout(RPC_CONNECT_TIMEOUT)
            .build()
            .map_err(|err| ChainError::Connect {
                network,
                reason: err.to_string(),
            })?;

        let endpoint = redact(url.as_str());
        let http = Http::with_client(client, url);
        let provider = RootProvider::new(RpcClient::new(http, false));

        Ok(Self {
            network,
            endpoint,
            provider,
        })
    }

    /// 建立连接并以 `eth_chainId` 验证节点可用。
    pub async fn connect(network: Network, rpc_url: &str) -> ChainResult<(Self, u64)> {
        let connection = Self::new(network, rpc_url)?;
        let chain_id = tokio::time::timeout(
            DIAL_TIMEOUT,
            connection.provider.get_chain_id().into_future(),
        )
            .await
            .map_err(|_| ChainError::Connect {
                network,
                reason: format!("no response within {}s", DIAL_TIMEOUT.as_secs()),
            })??;
        Ok((connection, chain_id))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn provider(&self) -> &RootProvider {
        &self.provider
    }

    /// 用 `auth` 中的参数签名 EIP-1559 交易并广播，返回交易哈希。
    pub async fn submit(
        &self,
        auth: &TransactionAuth,
        to: Address,
        input: Bytes,
    ) -> ChainResult<TxHash> {
        let tx = TxEip1559 {
            chain_id: auth.chain_id,
            nonce: auth.nonce(),
            gas_limit: auth.gas_limit,
            max_fee_per_gas: auth.gas_fee_cap,
            max_priority_fee_per_gas: auth.gas_tip_cap,
            to: TxKind::Call(to),
            value: auth.value,
            access_list: Default::default(),
            input,
        };
        let signature = auth.signer.sign_hash_sync(&tx.signature_hash())?;
        let signed = tx.into_signed(signature);
        let tx_hash = *signed.hash();
        let raw = TxEnvelope::Eip1559(signed).encoded_2718();

        cancellable(&auth.cancel, self.provider.send_raw_transaction(&raw)).await?;
        debug!(
            target: "chain::submit",
            network = %self.network,
            to = %to,
            nonce = auth.nonce(),
            tx_hash = %tx_hash,
            "交易已广播"
        );
        Ok(tx_hash)
    }
}

#[async_trait]
impl ChainRpc for ChainConnection {
    fn network(&self) -> Network {
        self.network
    }

    async fn chain_id(&self, cancel: &CancellationToken) -> ChainResult<u64> {
        cancellable(cancel, self.provider.get_chain_id().into_future()).await
    }

    async fn pending_nonce(
        &self,
        account: Address,
        cancel: &CancellationToken,
    ) -> ChainResult<u64> {
        cancellable(
            cancel,
            self.provider
                .get_transaction_count(account)
                .pending()
                .into_future(),
        )
        .await
    }

    async fn suggest_tip_cap(&self, cancel: &CancellationToken) -> ChainResult<u128> {
        cancellable(
            cancel,
            self.provider.get_max_priority_fee_per_gas().into_future(),
        )
        .await
    }

    async fn latest_base_fee(&self, cancel: &CancellationToken) -> ChainResult<Option<u128>> {
        let block = cancellable(
            cancel,
            self.provider
                .get_block_by_number(BlockNumberOrTag::Latest)
                .into_future(),
        )
        .await?
        .ok_or(ChainError::MissingBlock("latest"))?;
        Ok(block.header.base_fee_per_gas.map(u128::from))
    }

    async fn receipt(
        &self,
        tx_hash: TxHash,
        cancel: &CancellationToken,
    ) -> ChainResult<Option<ReceiptSummary>> {
        let receipt = cancellable(
            cancel,
            self.provider.get_transaction_receipt(tx_hash).into_future(),
        )
        .await?;
        Ok(receipt.map(|receipt| ReceiptSummary {
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        }))
    }
}

/// 去掉路径与查询参数，避免 API key 出现在日志中。
fn redact(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}", url.scheme(), host),
            None => url.scheme().to_string(),
        },
        Err(_) => "<invalid>".to_string(),
    }
}
