use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;

use node_dashboard::cache::CacheStore;
use node_dashboard::cli::Cli;
use node_dashboard::config::Config;
use node_dashboard::dashboard::Dashboard;
use node_dashboard::error::AppError;
use node_dashboard::gateway::Gateway;
use node_dashboard::logging::init_logging;
use node_dashboard::metrics::AppMetrics;
use node_dashboard::services::NodeRpcClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let config = Config::from_env_and_cli(&cli)
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    tracing::info!(
        chain = %config.chain,
        node = %format!("{}:{}", config.node_ip, config.rpc_port),
        cache_dir = %config.cache_dir.display(),
        "Dashboard starting"
    );

    if let Err(err) = run(&cli, config).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, config: Config) -> Result<(), AppError> {
    let metrics = Arc::new(AppMetrics::new()?);

    let client = NodeRpcClient::new(config.profile(), config.rpc_timeout())?;
    let store = CacheStore::for_chain(&config.cache_dir, config.chain);
    let gateway = Gateway::new(
        Arc::new(client),
        store,
        config.chain.ttl_policy(config.cache_default_ttl_seconds),
    )
    .with_metrics(metrics.clone());

    let dashboard = Dashboard::new(gateway, config.chain, config.sections);
    let report = dashboard.render().await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    if cli.print_metrics {
        println!();
        print!("{}", metrics.render()?);
    }

    Ok(())
}
