use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_SECONDS;
use crate::chain::{Chain, ChainProfile, Credentials};
use crate::cli::Cli;
use crate::dashboard::SectionToggles;
use crate::services::rpc_client::DEFAULT_TIMEOUT;

const DEFAULT_NODE_IP: &str = "127.0.0.1";

#[derive(Debug, Clone)]
pub struct Config {
    pub chain: Chain,
    pub node_ip: String,
    pub rpc_port: u16,
    pub credentials: Option<Credentials>,
    pub sections: SectionToggles,
    pub cache_dir: PathBuf,
    pub cache_default_ttl_seconds: u64,
    pub rpc_timeout_seconds: u64,
}

impl Config {
    /// Environment values with command-line overrides on top.
    pub fn from_env_and_cli(cli: &Cli) -> Result<Self, String> {
        Self::from_lookup(|key| cli.override_for(key).or_else(|| env::var(key).ok()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let chain: Chain = var("NETWORK")
            .ok_or("NETWORK is required (BTC, LTC or XMR)")?
            .parse()?;

        let node_ip = var("NODE_IP").unwrap_or_else(|| DEFAULT_NODE_IP.to_string());

        let rpc_port = match var("RPC_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("RPC_PORT must be a valid port number, got {}", raw))?,
            None => chain.default_rpc_port(),
        };

        let credentials = Credentials::from_parts(var("RPC_USER"), var("RPC_PASS"));

        let toggle = |key: &str| -> Result<bool, String> {
            match var(key) {
                Some(raw) => parse_toggle(&raw).ok_or_else(|| format!("{} must be a boolean, got {}", key, raw)),
                None => Ok(true),
            }
        };
        let sections = SectionToggles {
            node_info: toggle("SHOW_NODE_INFO")?,
            blockchain: toggle("SHOW_BLOCKCHAIN")?,
            mempool: toggle("SHOW_MEMPOOL")?,
            mining: toggle("SHOW_MINING")?,
            transactions: toggle("SHOW_TRANSACTIONS")?,
            fees: toggle("SHOW_FEES")?,
        };

        let cache_dir = var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let cache_default_ttl_seconds = parse_seconds(var("CACHE_DEFAULT_TTL_SECONDS"), "CACHE_DEFAULT_TTL_SECONDS", DEFAULT_TTL_SECONDS)?;

        let rpc_timeout_seconds = parse_seconds(var("RPC_TIMEOUT_SECONDS"), "RPC_TIMEOUT_SECONDS", DEFAULT_TIMEOUT.as_secs())?;
        if rpc_timeout_seconds == 0 {
            return Err("RPC_TIMEOUT_SECONDS must be greater than zero".to_string());
        }

        Ok(Self {
            chain,
            node_ip,
            rpc_port,
            credentials,
            sections,
            cache_dir,
            cache_default_ttl_seconds,
            rpc_timeout_seconds,
        })
    }

    pub fn profile(&self) -> ChainProfile {
        ChainProfile::new(self.chain, &self.node_ip, self.rpc_port, self.credentials.clone())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }
}

/// `1`, `true`, `on` and `yes` are true; `0`, `false`, `off` and `no` are false.
pub fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_seconds(raw: Option<String>, key: &str, default: u64) -> Result<u64, String> {
    match raw {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
