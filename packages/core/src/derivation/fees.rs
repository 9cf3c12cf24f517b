//! Fee estimate conversions.

use serde_json::Value;

use super::payload::{lenient_f64, PayloadExt};
use super::units::{format_number, NOT_AVAILABLE};

/// Atomic units per coin on the bitcoin-style chains.
pub const SATOSHIS_PER_COIN: f64 = 100_000_000.0;
/// Atomic units (piconero) per XMR.
pub const PICONERO_PER_XMR: f64 = 1_000_000_000_000.0;

/// Decimals used to show Monero per-byte fee tiers.
pub const MONERO_FEE_DECIMALS: usize = 12;

/// Coin-per-kvB to smallest-unit-per-vbyte: `round(rate * 1e8 / 1000)`.
pub fn fee_rate_per_vbyte(coin_per_kvb: f64) -> u64 {
    let rate = (coin_per_kvb * SATOSHIS_PER_COIN / 1000.0).round();
    if rate.is_finite() && rate > 0.0 {
        rate as u64
    } else {
        0
    }
}

/// Display value for one `estimatesmartfee` answer.
///
/// Nodes without enough data answer with `errors` and no `feerate`.
pub fn smart_fee_display(estimate: Option<&Value>, label: &str) -> String {
    estimate
        .and_then(|payload| payload.f64_at(&["feerate"]))
        .map(|rate| format!("{} {}", fee_rate_per_vbyte(rate), label))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Atomic amount to whole coins with fixed precision and a unit suffix.
pub fn atomic_to_coin(amount: f64, atomic_per_coin: f64, decimals: usize, unit: &str) -> String {
    format!("{} {}", format_number(amount / atomic_per_coin, decimals), unit)
}

/// Monero `get_fee_estimate` priority tiers, fastest first.
///
/// `fees` is ordered slowest to fastest; missing tiers read as zero.
pub fn monero_fee_tiers(payload: &Value, unit: &str) -> Vec<(&'static str, String)> {
    const TIERS: [(&str, usize); 4] = [("Fast", 3), ("Medium", 2), ("Slow", 1), ("Slowest", 0)];

    let fees = payload.at(&["fees"]).and_then(Value::as_array);
    TIERS
        .iter()
        .map(|(label, idx)| {
            let amount = fees
                .and_then(|tiers| tiers.get(*idx))
                .and_then(lenient_f64)
                .unwrap_or(0.0);
            (*label, atomic_to_coin(amount, PICONERO_PER_XMR, MONERO_FEE_DECIMALS, unit))
        })
        .collect()
}

/// Total fees waiting in the Monero pool, in whole XMR.
///
/// Reads `pool_stats.fee_total`, falling back to a top-level `fee_total`;
/// the atomic total is what gets divided, not the zero default.
pub fn monero_pool_fee_total(payload: &Value) -> f64 {
    payload
        .f64_at(&["pool_stats", "fee_total"])
        .or_else(|| payload.f64_at(&["fee_total"]))
        .unwrap_or(0.0)
        / PICONERO_PER_XMR
}
