use std::time::Duration;

use alloy::primitives::Address;
use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::chain::Network;
use crate::engine::{DexVersion, EngineResult, Quote, SwapResult, SwapStatus};

use super::format::short_token;
use super::metrics::{APPROVAL_TOTAL, QUOTE_LATENCY_MS, QUOTE_TOTAL, SWAP_TOTAL, prometheus_enabled};

pub fn quote_outcome(
    network: Network,
    dex: DexVersion,
    result: &EngineResult<Quote>,
    elapsed: Duration,
) {
    let latency_ms = elapsed.as_secs_f64() * 1_000.0;
    let outcome = match result {
        Ok(quote) => {
            info!(
                target: "monitoring::quote",
                event = "quote",
                network = %network,
                dex = %dex,
                token_in = %short_token(&quote.token_in),
                token_out = %short_token(&quote.token_out),
                amount_in = %quote.amount_in,
                amount_out = %quote.amount_out,
                fee_tier = ?quote.fee_tier,
                latency_ms,
                "quote ready"
            );
            "ok"
        }
        Err(err) => {
            warn!(
                target: "monitoring::quote",
                event = "quote",
                network = %network,
                dex = %dex,
                error = %err,
                latency_ms,
                "quote failed"
            );
            "error"
        }
    };

    if prometheus_enabled() {
        counter!(
            QUOTE_TOTAL,
            "network" => network.as_str(),
            "dex" => dex.as_str(),
            "result" => outcome
        )
        .increment(1);
        histogram!(
            QUOTE_LATENCY_MS,
            "network" => network.as_str(),
            "dex" => dex.as_str()
        )
        .record(latency_ms);
    }
}

pub fn swap_outcome(network: Network, dex: DexVersion, result: &SwapResult) {
    match result.status {
        SwapStatus::Pending => info!(
            target: "monitoring::swap",
            event = "swap",
            network = %network,
            dex = %dex,
            tx = ?result.transaction_hash,
            amount_in = %result.sell_token_qty,
            amount_out_min = %result.amount_out_min,
            fee_tier = ?result.fee_tier,
            "swap broadcast"
        ),
        SwapStatus::Failed => warn!(
            target: "monitoring::swap",
            event = "swap",
            network = %network,
            dex = %dex,
            code = ?result.error_code(),
            message = result.error.as_ref().map(|error| error.message.as_str()).unwrap_or_default(),
            "swap failed"
        ),
    }

    if prometheus_enabled() {
        let status = match result.status {
            SwapStatus::Pending => "pending",
            SwapStatus::Failed => "failed",
        };
        counter!(
            SWAP_TOTAL,
            "network" => network.as_str(),
            "dex" => dex.as_str(),
            "status" => status
        )
        .increment(1);
    }
}

pub fn approval_outcome(network: Network, token: &Address, outcome: &'static str) {
    info!(
        target: "monitoring::approval",
        event = "approval",
        network = %network,
        token = %short_token(token),
        outcome,
        "approval finished"
    );

    if prometheus_enabled() {
        counter!(
            APPROVAL_TOTAL,
            "network" => network.as_str(),
            "outcome" => outcome
        )
        .increment(1);
    }
}
