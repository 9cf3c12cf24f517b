//! Dashboard sections: which calls each needs and how its values are derived.

use serde::Serialize;
use serde_json::{json, Value};

use super::report::{Metric, SectionValues};
use crate::chain::{Chain, RpcDialect};
use crate::derivation::fees::{
    monero_fee_tiers, monero_pool_fee_total, smart_fee_display, PICONERO_PER_XMR,
};
use crate::derivation::supply::{
    blocks_to_retarget, circulating_supply, current_subsidy, next_halving,
};
use crate::derivation::units::{
    format_bytes, format_count, format_gigabytes, format_hashrate, format_number,
    sync_progress, yes_no, NOT_AVAILABLE,
};
use crate::derivation::PayloadExt;
use crate::gateway::{BatchResult, RpcCall};

/// Monero's target block time in seconds.
const MONERO_BLOCK_TARGET_SECONDS: f64 = 120.0;

/// Confirmation targets for the fast, medium and slow estimates.
const FEE_TIERS: [(&str, u64); 3] = [("Fast", 1), ("Medium", 6), ("Slow", 144)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    NodeInfo,
    Blockchain,
    Mempool,
    Mining,
    Transactions,
    Fees,
}

impl Section {
    /// Display order.
    pub const ALL: [Section; 6] = [
        Section::NodeInfo,
        Section::Blockchain,
        Section::Mempool,
        Section::Mining,
        Section::Transactions,
        Section::Fees,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::NodeInfo => "Node Info",
            Section::Blockchain => "Blockchain",
            Section::Mempool => "Mempool",
            Section::Mining => "Mining",
            Section::Transactions => "Transactions",
            Section::Fees => "Fees",
        }
    }

    /// Calls whose payloads this section is derived from.
    pub fn calls(&self, dialect: RpcDialect) -> Vec<RpcCall> {
        let methods: &[&str] = match (self, dialect) {
            (Section::Fees, RpcDialect::JsonRpc) => {
                return FEE_TIERS
                    .iter()
                    .map(|(_, target)| RpcCall::with_params("estimatesmartfee", vec![json!(target)]))
                    .collect();
            }
            (Section::NodeInfo, RpcDialect::JsonRpc) => &["getnetworkinfo", "getblockchaininfo"],
            (Section::Blockchain, RpcDialect::JsonRpc) => &["getblockchaininfo"],
            (Section::Mempool, RpcDialect::JsonRpc) => &["getmempoolinfo"],
            (Section::Mining, RpcDialect::JsonRpc) => &["getmininginfo", "getblockchaininfo"],
            (Section::Transactions, RpcDialect::JsonRpc) => &["getchaintxstats"],

            (Section::NodeInfo, RpcDialect::MoneroDaemon) => &["get_info"],
            (Section::Blockchain, RpcDialect::MoneroDaemon) => {
                &["get_block_count", "get_last_block_header", "get_info"]
            }
            (Section::Mempool, RpcDialect::MoneroDaemon) => &["get_transaction_pool_stats"],
            (Section::Mining, RpcDialect::MoneroDaemon) => &["get_info", "get_miner_data"],
            (Section::Transactions, RpcDialect::MoneroDaemon) => &["get_info"],
            (Section::Fees, RpcDialect::MoneroDaemon) => &["get_fee_estimate"],
        };
        methods.iter().map(|m| RpcCall::new(*m)).collect()
    }

    /// Derive this section's values from a completed batch.
    pub fn derive(&self, chain: Chain, batch: &BatchResult) -> SectionValues {
        let calls = self.calls(chain.dialect());

        if *self == Section::Fees && chain.dialect() == RpcDialect::JsonRpc {
            return smart_fee_section(chain, &calls, batch);
        }

        let payloads: Option<Vec<&Value>> = calls.iter().map(|call| batch.payload(call)).collect();
        let Some(payloads) = payloads else {
            return SectionValues::Unavailable;
        };

        let metrics = match (self, payloads.as_slice()) {
            (Section::NodeInfo, [net, info]) => node_info(net, info),
            (Section::NodeInfo, [info]) => monero_node_info(info),
            (Section::Blockchain, [info]) => blockchain(info),
            (Section::Blockchain, [count, _header, info]) => monero_blockchain(count, info),
            (Section::Mempool, [pool]) => match chain.dialect() {
                RpcDialect::JsonRpc => mempool(chain, pool),
                RpcDialect::MoneroDaemon => monero_mempool(chain, pool),
            },
            (Section::Mining, [first, second]) => match chain.dialect() {
                // getmininginfo, getblockchaininfo
                RpcDialect::JsonRpc => mining_with_halvings(chain, first, second),
                // get_info, get_miner_data
                RpcDialect::MoneroDaemon => monero_mining(chain, first, second),
            },
            (Section::Transactions, [stats]) => transactions(chain, stats),
            (Section::Fees, [estimate]) => monero_fee_tiers(estimate, chain.unit())
                .into_iter()
                .map(|(label, value)| Metric::new(label, value))
                .collect(),
            _ => return SectionValues::Unavailable,
        };
        SectionValues::Available(metrics)
    }
}

/// Which sections are rendered. Every section is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionToggles {
    pub node_info: bool,
    pub blockchain: bool,
    pub mempool: bool,
    pub mining: bool,
    pub transactions: bool,
    pub fees: bool,
}

impl Default for SectionToggles {
    fn default() -> Self {
        Self {
            node_info: true,
            blockchain: true,
            mempool: true,
            mining: true,
            transactions: true,
            fees: true,
        }
    }
}

impl SectionToggles {
    pub fn is_enabled(&self, section: Section) -> bool {
        match section {
            Section::NodeInfo => self.node_info,
            Section::Blockchain => self.blockchain,
            Section::Mempool => self.mempool,
            Section::Mining => self.mining,
            Section::Transactions => self.transactions,
            Section::Fees => self.fees,
        }
    }

    /// Enabled sections in display order.
    pub fn enabled(&self) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|section| self.is_enabled(*section))
            .collect()
    }
}

fn str_or_na(payload: &Value, path: &[&str]) -> String {
    payload.str_at(path).unwrap_or(NOT_AVAILABLE).to_string()
}

fn coin_amount(amount: f64, decimals: usize, unit: &str) -> String {
    format!("{} {}", format_number(amount, decimals), unit)
}

fn node_info(net: &Value, info: &Value) -> Vec<Metric> {
    vec![
        Metric::new("Version", str_or_na(net, &["subversion"])),
        Metric::new("Chain", str_or_na(info, &["chain"])),
        Metric::new("Pruned", info.bool_at(&["pruned"]).unwrap_or(false).to_string()),
        Metric::new("Connections", format_count(net.u64_at(&["connections"]).unwrap_or(0))),
    ]
}

fn monero_node_info(info: &Value) -> Vec<Metric> {
    let connections = info.u64_at(&["incoming_connections_count"]).unwrap_or(0)
        + info.u64_at(&["outgoing_connections_count"]).unwrap_or(0);
    vec![
        Metric::new("Version", str_or_na(info, &["version"])),
        Metric::new("Chain", str_or_na(info, &["nettype"])),
        Metric::new("Connections", format_count(connections)),
    ]
}

fn blockchain(info: &Value) -> Vec<Metric> {
    vec![
        Metric::new("Blocks", format_count(info.u64_at(&["blocks"]).unwrap_or(0))),
        Metric::new("Headers", format_count(info.u64_at(&["headers"]).unwrap_or(0))),
        Metric::new("Sync Progress", sync_progress(info.f64_at(&["verificationprogress"]))),
        Metric::new("Chain Size", format_gigabytes(info.f64_at(&["size_on_disk"]))),
    ]
}

fn monero_blockchain(count: &Value, info: &Value) -> Vec<Metric> {
    let blocks = format_count(count.u64_at(&["count"]).unwrap_or(0));
    vec![
        Metric::new("Blocks", blocks.clone()),
        Metric::new("Headers", blocks),
        Metric::new("Synchronized", yes_no(info.bool_at(&["synchronized"]).unwrap_or(false))),
        Metric::new("Chain Size", format_gigabytes(info.f64_at(&["database_size"]))),
    ]
}

fn mempool(chain: Chain, pool: &Value) -> Vec<Metric> {
    let mut metrics = vec![
        Metric::new("Transactions", format_count(pool.u64_at(&["size"]).unwrap_or(0))),
        Metric::new("Size", format_bytes(pool.f64_at(&["bytes"]))),
    ];
    if chain.reports_mempool_fees() {
        let total = pool.f64_at(&["total_fee"]).unwrap_or(0.0);
        metrics.push(Metric::new("Total Fees", coin_amount(total, 8, chain.unit())));
    }
    metrics
}

fn monero_mempool(chain: Chain, pool: &Value) -> Vec<Metric> {
    vec![
        Metric::new(
            "Transactions",
            format_count(pool.u64_at(&["pool_stats", "txs_total"]).unwrap_or(0)),
        ),
        Metric::new("Size", format_bytes(pool.f64_at(&["pool_stats", "bytes_total"]))),
        Metric::new(
            "Total Fees",
            coin_amount(monero_pool_fee_total(pool), 6, chain.unit()),
        ),
    ]
}

fn mining_with_halvings(chain: Chain, mining: &Value, info: &Value) -> Vec<Metric> {
    let difficulty = info
        .f64_at(&["difficulty"])
        .or_else(|| mining.f64_at(&["difficulty"]))
        .unwrap_or(0.0);
    let blocks = info.u64_at(&["blocks"]).unwrap_or(0);

    let mut metrics = vec![
        Metric::new("Difficulty", format_number(difficulty, 0)),
        Metric::new("Hash Rate", format_hashrate(mining.f64_at(&["networkhashps"]))),
    ];

    if let (Some(interval), Some(initial)) = (chain.halving_interval(), chain.initial_subsidy()) {
        let supply = circulating_supply(blocks, interval, initial);
        let subsidy = current_subsidy(blocks, interval, initial);
        metrics.push(Metric::new("Circulating Supply", coin_amount(supply, 0, chain.unit())));
        metrics.push(Metric::new("Block Subsidy", format!("{} {}", subsidy, chain.unit())));
        if let Some(countdown) = next_halving(blocks, interval) {
            metrics.push(Metric::new(
                "Blocks to Halving",
                format_count(countdown.blocks_remaining),
            ));
        }
    }
    if let Some(interval) = chain.retarget_interval() {
        metrics.push(Metric::new(
            "Blocks to Retarget",
            format_count(blocks_to_retarget(blocks, interval)),
        ));
    }
    metrics
}

fn monero_mining(chain: Chain, info: &Value, miner: &Value) -> Vec<Metric> {
    let difficulty = info.f64_at(&["difficulty"]).unwrap_or(0.0);
    let generated = miner.f64_at(&["already_generated_coins"]).unwrap_or(0.0);
    vec![
        Metric::new("Difficulty", format_number(difficulty, 0)),
        Metric::new(
            "Hash Rate",
            format_hashrate(Some(difficulty / MONERO_BLOCK_TARGET_SECONDS)),
        ),
        Metric::new("Block Height", format_count(info.u64_at(&["height"]).unwrap_or(0))),
        Metric::new(
            "Circulating Supply",
            coin_amount(generated / PICONERO_PER_XMR, 0, chain.unit()),
        ),
    ]
}

fn transactions(chain: Chain, stats: &Value) -> Vec<Metric> {
    match chain.dialect() {
        RpcDialect::JsonRpc => vec![
            Metric::new("Total Transactions", format_count(stats.u64_at(&["txcount"]).unwrap_or(0))),
            Metric::new("Average Rate", format!("{:.2}", stats.f64_at(&["txrate"]).unwrap_or(0.0))),
            Metric::new(
                "Window Transactions",
                format_count(stats.u64_at(&["window_tx_count"]).unwrap_or(0)),
            ),
        ],
        RpcDialect::MoneroDaemon => vec![
            Metric::new("Total Transactions", format_count(stats.u64_at(&["tx_count"]).unwrap_or(0))),
            Metric::new("Average Rate", NOT_AVAILABLE),
            Metric::new("Window Transactions", NOT_AVAILABLE),
        ],
    }
}

/// Each tier stands alone; the section is only lost when every tier failed.
fn smart_fee_section(chain: Chain, calls: &[RpcCall], batch: &BatchResult) -> SectionValues {
    let estimates: Vec<Option<&Value>> = calls.iter().map(|call| batch.payload(call)).collect();
    if estimates.iter().all(Option::is_none) {
        return SectionValues::Unavailable;
    }

    let metrics = FEE_TIERS
        .iter()
        .zip(estimates)
        .map(|((label, _), estimate)| {
            Metric::new(*label, smart_fee_display(estimate, chain.fee_rate_label()))
        })
        .collect();
    SectionValues::Available(metrics)
}
