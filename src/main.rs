mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use gas_trends::api::{self, AppState};
use gas_trends::config::Config;
use gas_trends::eth::EthClient;
use gas_trends::merge::{Limit, TopDappsMerger};
use gas_trends::models::TopDappsResponse;
use gas_trends::poller::run_poller;
use gas_trends::protocols::ProtocolTable;
use gas_trends::scan_stats::ScanStats;
use gas_trends::scanner::ChainScanner;
use gas_trends::storage::HotStore;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    tracing::info!(
        "monitoring {} chain(s) with a {:?} per-attempt timeout",
        config.chains.len(),
        config.rpc_timeout
    );

    let client = EthClient::new(config.rpc_timeout)?;
    let scanner = ChainScanner::new(Arc::new(client), Arc::new(ScanStats::new()));
    let protocols: Arc<ProtocolTable> = Arc::new(config.protocols.clone());
    let merger = TopDappsMerger::new(scanner, protocols.clone());
    let chains = Arc::new(config.chains.clone());

    match cli.command {
        Commands::Scan { limit } => {
            let limit = Limit::new(limit)?;
            let dapps = merger.merge_top_dapps(&chains, limit).await;
            print_json(&TopDappsResponse { dapps })?;
        }
        Commands::Watch {
            interval_secs,
            limit,
            cycles,
        } => {
            let limit = Limit::new(limit)?;
            let store = HotStore::connect(&config.database_url).await?;
            let merger = merger.with_sink(Arc::new(store));
            run_poller(
                merger,
                chains,
                Duration::from_secs(interval_secs.max(1)),
                limit,
                cycles,
            )
            .await;
        }
        Commands::Hot { limit } => {
            let limit = Limit::new(limit)?;
            let store = HotStore::connect(&config.database_url).await?;
            let dapps = store.hot_ranking(&chains, &protocols, limit).await?;
            print_json(&TopDappsResponse { dapps })?;
        }
        Commands::Serve { addr, poll_secs } => {
            let bind = addr.unwrap_or_else(|| config.http_bind_addr.clone());
            let store = HotStore::connect(&config.database_url).await?;

            if let Some(secs) = poll_secs {
                let poller = merger.clone().with_sink(Arc::new(store.clone()));
                tokio::spawn(run_poller(
                    poller,
                    chains.clone(),
                    Duration::from_secs(secs.max(1)),
                    Limit::default(),
                    None,
                ));
            }

            let state = AppState {
                merger,
                chains,
                store,
            };
            api::run_http_server(&bind, state).await?;
        }
    }

    Ok(())
}

fn print_json(response: &TopDappsResponse) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(response)?;
    println!("{}", rendered);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
