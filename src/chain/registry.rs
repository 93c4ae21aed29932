use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use super::connection::ChainConnection;
use super::network::Network;

/// 启动时解析好的单个网络 RPC 端点。
#[derive(Debug, Clone)]
pub struct ChainEndpoint {
    pub network: Network,
    pub rpc_url: String,
}

/// Network → 已连接 RPC 会话，启动后只读。
#[derive(Clone, Default)]
pub struct ChainRegistry {
    connections: BTreeMap<Network, Arc<ChainConnection>>,
}

impl ChainRegistry {
    /// 依次连接每个网络；连接失败的网络记录错误后跳过，不影响其他网络。
    pub async fn connect_all(endpoints: &[ChainEndpoint]) -> Self {
        let mut connections = BTreeMap::new();
        for endpoint in endpoints {
            match ChainConnection::connect(endpoint.network, &endpoint.rpc_url).await {
                Ok((connection, chain_id)) => {
                    info!(
                        target: "chain::registry",
                        network = %endpoint.network,
                        chain_id,
                        endpoint = connection.endpoint(),
                        "节点连接成功"
                    );
                    connections.insert(endpoint.network, Arc::new(connection));
                }
                Err(err) => {
                    error!(
                        target: "chain::registry",
                        network = %endpoint.network,
                        error = %err,
                        "节点连接失败，跳过该网络"
                    );
                }
            }
        }
        Self { connections }
    }

    pub fn insert(&mut self, connection: ChainConnection) {
        let network = crate::chain::ChainRpc::network(&connection);
        self.connections.insert(network, Arc::new(connection));
    }

    pub fn get(&self, network: Network) -> Option<Arc<ChainConnection>> {
        self.connections.get(&network).cloned()
    }

    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.connections.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }
}
