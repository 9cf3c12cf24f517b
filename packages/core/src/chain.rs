//! Supported chains and their capability records.
//!
//! Everything that differs between nodes (RPC dialect, halving schedule,
//! unit labels, cache TTLs) is answered here so the rest of the crate
//! never branches on chain names.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::cache::TtlPolicy;

/// Blocks between difficulty retargets on the bitcoin-style chains.
pub const RETARGET_INTERVAL: u64 = 2016;

/// How requests for a chain are shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcDialect {
    /// JSON-RPC 2.0 envelopes posted to a single endpoint.
    JsonRpc,
    /// Monero daemon: JSON-RPC at `/json_rpc` for some methods, bare
    /// JSON POSTs to `/<method>` for the rest.
    MoneroDaemon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Bitcoin,
    Litecoin,
    Monero,
}

impl Chain {
    /// Short lowercase identifier, also used to name the cache file.
    pub fn identifier(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "btc",
            Chain::Litecoin => "ltc",
            Chain::Monero => "xmr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "Bitcoin",
            Chain::Litecoin => "Litecoin",
            Chain::Monero => "Monero",
        }
    }

    /// Native unit label appended to coin amounts.
    pub fn unit(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "BTC",
            Chain::Litecoin => "LTC",
            Chain::Monero => "XMR",
        }
    }

    pub fn dialect(&self) -> RpcDialect {
        match self {
            Chain::Bitcoin | Chain::Litecoin => RpcDialect::JsonRpc,
            Chain::Monero => RpcDialect::MoneroDaemon,
        }
    }

    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Chain::Bitcoin => 8332,
            Chain::Litecoin => 9332,
            Chain::Monero => 18081,
        }
    }

    /// Blocks per subsidy halving; `None` for chains without a halving schedule.
    pub fn halving_interval(&self) -> Option<u64> {
        match self {
            Chain::Bitcoin => Some(210_000),
            Chain::Litecoin => Some(840_000),
            Chain::Monero => None,
        }
    }

    /// Block subsidy of the first epoch, in whole coins.
    pub fn initial_subsidy(&self) -> Option<f64> {
        self.halving_interval().map(|_| 50.0)
    }

    pub fn retarget_interval(&self) -> Option<u64> {
        match self.dialect() {
            RpcDialect::JsonRpc => Some(RETARGET_INTERVAL),
            RpcDialect::MoneroDaemon => None,
        }
    }

    /// Label shown next to converted fee estimates.
    pub fn fee_rate_label(&self) -> &'static str {
        match self {
            Chain::Bitcoin => "sat/vB",
            Chain::Litecoin => "lit/vB",
            Chain::Monero => "per kB",
        }
    }

    /// Whether `getmempoolinfo` carries a `total_fee` worth showing.
    pub fn reports_mempool_fees(&self) -> bool {
        !matches!(self, Chain::Litecoin)
    }

    /// Per-method cache TTLs tuned for this chain's RPC surface.
    pub fn ttl_policy(&self, default_ttl_seconds: u64) -> TtlPolicy {
        let overrides: &[(&str, u64)] = match self.dialect() {
            RpcDialect::JsonRpc => &[
                ("getblockchaininfo", 30),
                ("getmempoolinfo", 20),
                ("getnetworkinfo", 90),
                ("getmininginfo", 60),
                ("getchaintxstats", 1800),
                ("estimatesmartfee", 120),
            ],
            RpcDialect::MoneroDaemon => &[
                ("get_info", 30),
                ("get_block_count", 15),
                ("get_last_block_header", 20),
                ("get_transaction_pool_stats", 20),
                ("get_miner_data", 20),
                ("get_fee_estimate", 20),
            ],
        };

        overrides
            .iter()
            .fold(TtlPolicy::new(default_ttl_seconds), |policy, (method, ttl)| {
                policy.with_override(*method, *ttl)
            })
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Ok(Chain::Bitcoin),
            "LTC" => Ok(Chain::Litecoin),
            "XMR" => Ok(Chain::Monero),
            other => Err(format!("Invalid NETWORK: {} (expected BTC, LTC or XMR)", other)),
        }
    }
}

/// Basic-auth credentials for the node's RPC interface.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Returns `None` when both parts are blank; auth applies if either is set.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        let username = username.unwrap_or_default();
        let password = password.unwrap_or_default();
        if username.is_empty() && password.is_empty() {
            None
        } else {
            Some(Self { username, password })
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// One configured node: which chain it runs and how to reach it.
#[derive(Debug, Clone)]
pub struct ChainProfile {
    pub chain: Chain,
    /// RPC base endpoint. For Monero this already ends in `/json_rpc`.
    pub endpoint: String,
    pub credentials: Option<Credentials>,
}

impl ChainProfile {
    pub fn new(chain: Chain, host: &str, port: u16, credentials: Option<Credentials>) -> Self {
        let base = format!("http://{}:{}", host, port);
        Self::with_base_url(chain, &base, credentials)
    }

    /// Build from an explicit base URL (scheme, host and port, no path).
    pub fn with_base_url(chain: Chain, base_url: &str, credentials: Option<Credentials>) -> Self {
        let base = base_url.trim_end_matches('/');
        let endpoint = match chain.dialect() {
            RpcDialect::JsonRpc => base.to_string(),
            RpcDialect::MoneroDaemon => format!("{}/json_rpc", base),
        };
        Self { chain, endpoint, credentials }
    }

    pub fn dialect(&self) -> RpcDialect {
        self.chain.dialect()
    }
}
