use std::path::PathBuf;

use clap::Parser;

/// Node dashboard CLI arguments
#[derive(Debug, Default, Parser)]
#[command(
    name = "node-dashboard",
    version,
    about = "Cached status dashboard for Bitcoin, Litecoin and Monero nodes"
)]
pub struct Cli {
    /// Chain the node runs (BTC, LTC or XMR)
    #[arg(long)]
    pub network: Option<String>,

    /// Node RPC host
    #[arg(long)]
    pub node_ip: Option<String>,

    /// Node RPC port (defaults to the chain's standard port)
    #[arg(long)]
    pub rpc_port: Option<u16>,

    /// Directory holding the per-chain cache files
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// RPC request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics after the report
    #[arg(long)]
    pub print_metrics: bool,
}

impl Cli {
    /// Command-line value standing in for environment variable `key`.
    pub fn override_for(&self, key: &str) -> Option<String> {
        match key {
            "NETWORK" => self.network.clone(),
            "NODE_IP" => self.node_ip.clone(),
            "RPC_PORT" => self.rpc_port.map(|p| p.to_string()),
            "CACHE_DIR" => self.cache_dir.as_ref().map(|d| d.display().to_string()),
            "RPC_TIMEOUT_SECONDS" => self.timeout.map(|t| t.to_string()),
            _ => None,
        }
    }
}
