use layeredge_node::config::LayerEdgeConfig;
use layeredge_node::session::verify_accounts;
use layeredge_node::{CycleOrchestrator, LiveSessionFactory};

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::{setup_logger, ProxyManager, WalletManager, WorkerRunner};
use dotenv::dotenv;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Account file, overrides `wallets_file`
    #[arg(short, long)]
    wallets: Option<String>,
    /// Proxy file, overrides `proxy_file`
    #[arg(short, long)]
    proxies: Option<String>,
    /// Run a single pass and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = LayerEdgeConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(wallets) = args.wallets {
        config.wallets_file = wallets;
    }
    if let Some(proxies) = args.proxies {
        config.proxy_file = proxies;
    }

    // Keep guard alive for file logging
    let _log_guard = setup_logger("LayerEdge Auto Bot", config.verbose, config.log_dir.as_deref());
    info!("LayerEdge Auto Bot started");

    if let Err(e) = run(config, args.once).await {
        error!(error = %format!("{:#}", e), "Critical error encountered");
        return Err(e);
    }
    Ok(())
}

async fn run(config: LayerEdgeConfig, once: bool) -> Result<()> {
    let proxies = ProxyManager::load_proxies(&config.proxy_file);
    let accounts = WalletManager::load_accounts(&config.wallets_file)?;
    verify_accounts(&accounts)?;
    info!(
        "Loaded {} wallets & {} proxies",
        accounts.len(),
        proxies.len()
    );

    let cycle_interval = config.cycle_interval();
    let orchestrator = CycleOrchestrator::new(
        accounts,
        proxies,
        LiveSessionFactory::new(config),
        cycle_interval,
    )?
    .single_pass(once);

    WorkerRunner::run_worker(&orchestrator).await?;
    Ok(())
}
