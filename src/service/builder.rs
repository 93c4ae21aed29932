use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::bindings::{AlloyErc20, AlloyV2Router, AlloyV3Router};
use crate::chain::{ChainRegistry, ChainRpc, Network, NonceSequencer};
use crate::config::QuoteswapConfig;
use crate::engine::{
    AllowanceManager, ConcentratedOrchestrator, ConstantProductOrchestrator, DexVersion,
    SignerIdentity, SwapOrchestrator, TxParamsBuilder,
};

/// 为每个已连接网络创建 v2 与 v3 编排器，共享同一个 nonce 串行器。
pub fn build_orchestrators(
    config: &QuoteswapConfig,
    registry: &ChainRegistry,
    identity: &SignerIdentity,
) -> BTreeMap<(Network, DexVersion), Arc<SwapOrchestrator>> {
    let nonces = Arc::new(NonceSequencer::new());
    let settings = config.execution_settings();
    let mut orchestrators = BTreeMap::new();

    for network in registry.networks() {
        let Some(connection) = registry.get(network) else {
            continue;
        };
        let chain = config.chains.get(network);
        let rpc: Arc<dyn ChainRpc> = connection.clone();
        let params = Arc::new(TxParamsBuilder::new(
            rpc,
            identity.clone(),
            Arc::clone(&nonces),
            config.engine.gas_limit,
        ));
        let erc20 = Arc::new(AlloyErc20::new(Arc::clone(&connection)));
        let allowance = || {
            AllowanceManager::new(erc20.clone(), Arc::clone(&params), config.engine.approval)
        };

        let v2_router = chain.v2_router_or_default(network);
        let v2 = ConstantProductOrchestrator::new(
            network,
            Arc::new(AlloyV2Router::new(v2_router, Arc::clone(&connection))),
            allowance(),
            Arc::clone(&params),
            settings.clone(),
        );
        orchestrators.insert(
            (network, DexVersion::V2),
            Arc::new(SwapOrchestrator::ConstantProduct(v2)),
        );

        let v3_router = chain.v3_router_or_default();
        let v3_quoter = chain.v3_quoter_or_default();
        let v3 = ConcentratedOrchestrator::new(
            network,
            Arc::new(AlloyV3Router::new(v3_router, v3_quoter, Arc::clone(&connection))),
            allowance(),
            Arc::clone(&params),
            settings.clone(),
        );
        orchestrators.insert(
            (network, DexVersion::V3),
            Arc::new(SwapOrchestrator::Concentrated(v3)),
        );

        info!(
            target: "service::builder",
            network = %network,
            v2_router = %v2_router,
            v3_router = %v3_router,
            v3_quoter = %v3_quoter,
            "编排器已注册"
        );
    }

    orchestrators
}
