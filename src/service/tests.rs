use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::engine::testing::*;
use crate::engine::{
    AllowanceManager, ConcentratedOrchestrator, ConstantProductOrchestrator, EngineError,
    ExecutionSettings, SwapStatus, TxParamsBuilder, codes,
};

struct Fixture {
    service: QuoteSwapService,
    v2: Arc<MockV2Router>,
    v3: Arc<MockV3Router>,
    token: Arc<MockErc20>,
}

fn fixture(default_recipient: Option<Address>) -> Fixture {
    let rpc = Arc::new(MockRpc::new(56));
    let params = Arc::new(params_for(rpc));
    let token = Arc::new(MockErc20::with_allowance(U256::MAX));
    let v2 = Arc::new(MockV2Router::returning(vec![U256::from(100u64), U256::from(250u64)]));
    let v3 = Arc::new(MockV3Router::new([(500, U256::from(260u64))]));
    v3.accept_swaps_on([500]);

    let allowance = |params: &Arc<TxParamsBuilder>| {
        AllowanceManager::new(token.clone(), Arc::clone(params), fast_policy())
    };

    let mut orchestrators = BTreeMap::new();
    orchestrators.insert(
        (Network::Bsc, DexVersion::V2),
        Arc::new(SwapOrchestrator::ConstantProduct(ConstantProductOrchestrator::new(
            Network::Bsc,
            v2.clone(),
            allowance(&params),
            Arc::clone(&params),
            ExecutionSettings::default(),
        ))),
    );
    orchestrators.insert(
        (Network::Bsc, DexVersion::V3),
        Arc::new(SwapOrchestrator::Concentrated(ConcentratedOrchestrator::new(
            Network::Bsc,
            v3.clone(),
            allowance(&params),
            Arc::clone(&params),
            ExecutionSettings::default(),
        ))),
    );

    Fixture {
        service: QuoteSwapService::new(
            orchestrators,
            default_recipient,
            CancellationToken::new(),
            Duration::from_secs(5),
        ),
        v2,
        v3,
        token,
    }
}

fn quote_request(dex: &str, chain: &str) -> GetQuoteRequest {
    GetQuoteRequest {
        token_in: TOKEN_A.to_string(),
        token_out: TOKEN_B.to_string(),
        amount: 100,
        slippage_bps: 50,
        dex: dex.to_string(),
        chain: chain.to_string(),
    }
}

fn swap_request(dex: &str, chain: &str, recipient: Option<&str>) -> ExecuteSwapRequest {
    ExecuteSwapRequest {
        quote: WireQuote {
            token_in: TOKEN_A.to_string(),
            token_out: TOKEN_B.to_string(),
            amount_in: "100".to_string(),
            amount_out: "250".to_string(),
            slippage_bps: 50,
            dex: dex.to_string(),
            chain: chain.to_string(),
            fee_tier: None,
        },
        recipient_address: recipient.map(str::to_string),
    }
}

#[tokio::test]
async fn routes_quote_to_matching_orchestrator() {
    let fixture = fixture(None);
    let quote = fixture
        .service
        .get_quote(quote_request("v2", "bsc"))
        .await
        .expect("quote");
    assert_eq!(quote.amount_out, U256::from(250u64));
    assert_eq!(fixture.v2.quote_calls().len(), 1);
    assert!(fixture.v3.quoted_tiers().is_empty());
}

#[tokio::test]
async fn unknown_chain_never_reaches_an_orchestrator() {
    let fixture = fixture(None);
    let err = fixture
        .service
        .get_quote(quote_request("v3", "solana"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no service found for chain: solana");
    assert_eq!(err.code(), codes::INVALID_REQUEST);
    assert!(fixture.v3.quoted_tiers().is_empty());
    assert!(fixture.v2.quote_calls().is_empty());
}

#[tokio::test]
async fn known_but_unconnected_chain_is_reported_as_missing_service() {
    let fixture = fixture(None);
    let err = fixture
        .service
        .get_quote(quote_request("v2", "eth"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no service found for chain: eth");
}

#[tokio::test]
async fn dex_is_validated_before_chain() {
    let fixture = fixture(None);
    let err = fixture
        .service
        .get_quote(quote_request("v9", "solana"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "unsupported dex version: v9");
}

#[tokio::test]
async fn malformed_token_address_is_a_client_error() {
    let fixture = fixture(None);
    let mut request = quote_request("v2", "bsc");
    request.token_in = "cake".to_string();
    let err = fixture.service.get_quote(request).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(fixture.v2.quote_calls().is_empty());
}

#[tokio::test]
async fn swap_uses_default_recipient_when_absent() {
    let fixture = fixture(Some(RECIPIENT));
    let result = fixture
        .service
        .execute_swap(swap_request("v3", "bsc", None))
        .await
        .expect("swap");
    assert_eq!(result.status, SwapStatus::Pending);
    let submissions = fixture.v3.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0.recipient, RECIPIENT);
    assert_eq!(submissions[0].0.amount_in, U256::from(100u64));
    assert_eq!(submissions[0].0.amount_out_minimum, U256::from(250u64));
}

#[tokio::test]
async fn explicit_recipient_overrides_default() {
    let fixture = fixture(Some(RECIPIENT));
    let explicit = Address::repeat_byte(0x77);
    fixture
        .service
        .execute_swap(swap_request("v2", "bsc", Some(&explicit.to_string())))
        .await
        .expect("swap");
    assert_eq!(fixture.v2.swaps()[0].0.to, explicit);
}

#[tokio::test]
async fn swap_without_any_recipient_is_rejected() {
    let fixture = fixture(None);
    let err = fixture
        .service
        .execute_swap(swap_request("v2", "bsc", None))
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert!(fixture.v2.swaps().is_empty());
    assert!(fixture.token.allowance_reads().is_empty());
}

#[tokio::test]
async fn swap_with_unknown_chain_is_rejected_before_dispatch() {
    let fixture = fixture(Some(RECIPIENT));
    let err = fixture
        .service
        .execute_swap(swap_request("v3", "polygon", None))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "no service found for chain: polygon");
    assert!(fixture.v3.submissions().is_empty());
}

#[tokio::test]
async fn shutdown_cancels_in_flight_requests() {
    let fixture = fixture(None);
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let service = QuoteSwapService::new(
        fixture.service.orchestrators.clone(),
        None,
        shutdown,
        Duration::from_secs(5),
    );
    let err = service
        .get_quote(quote_request("v3", "bsc"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Engine(EngineError::Cancelled)));
}

#[test]
fn routes_list_registered_pairs() {
    let fixture = fixture(None);
    assert_eq!(
        fixture.service.routes(),
        vec![(Network::Bsc, DexVersion::V2), (Network::Bsc, DexVersion::V3)]
    );
}
