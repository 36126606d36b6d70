use crate::config::LayerEdgeConfig;
use crate::session::{NodeClient, NodeSession};
use anyhow::{bail, Result};
use async_trait::async_trait;
use core_logic::{success, Account, ProxyConfig, ProxyManager, ReqwestExecutor, Worker, WorkerStats};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

/// Opens a fresh session for one account and its assigned proxy.
pub trait SessionFactory: Send + Sync {
    type Client: NodeClient;

    fn open(
        &self,
        account: &Account,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Self::Client>;
}

/// Sessions backed by a real HTTP client.
pub struct LiveSessionFactory {
    config: LayerEdgeConfig,
}

impl LiveSessionFactory {
    pub fn new(config: LayerEdgeConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for LiveSessionFactory {
    type Client = NodeSession<ReqwestExecutor>;

    fn open(
        &self,
        account: &Account,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Self::Client> {
        Ok(NodeSession::connect(
            &self.config,
            proxy,
            Some(&account.private_key),
            cancel.clone(),
        )?)
    }
}

/// Counters for one pass over the account list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub processed: u64,
    pub already_active: u64,
    pub activated: u64,
    pub failed: u64,
}

pub struct CycleOrchestrator<F> {
    accounts: Vec<Account>,
    proxies: ProxyManager,
    factory: F,
    cycle_interval: Duration,
    single_pass: bool,
}

impl<F: SessionFactory> CycleOrchestrator<F> {
    pub fn new(
        accounts: Vec<Account>,
        proxies: ProxyManager,
        factory: F,
        cycle_interval: Duration,
    ) -> Result<Self> {
        if accounts.is_empty() {
            bail!("No wallets found");
        }

        Ok(Self {
            accounts,
            proxies,
            factory,
            cycle_interval,
            single_pass: false,
        })
    }

    /// Stop after the first pass instead of sleeping and repeating.
    pub fn single_pass(mut self, single_pass: bool) -> Self {
        self.single_pass = single_pass;
        self
    }

    pub fn proxy_for(&self, index: usize) -> Option<&ProxyConfig> {
        self.proxies.for_index(index)
    }

    /// One sequential pass in list order. Per-account failures are logged
    /// and counted; they never stop the pass.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> CycleReport {
        let mut report = CycleReport::default();

        for (i, account) in self.accounts.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Cycle interrupted after {} wallets", report.processed);
                break;
            }

            let span = tracing::info_span!("wallet", wallet_id = %format!("{:03}", i + 1));
            self.process_account(i, account, cancel, &mut report)
                .instrument(span)
                .await;
            report.processed += 1;
        }

        report
    }

    async fn process_account(
        &self,
        index: usize,
        account: &Account,
        cancel: &CancellationToken,
        report: &mut CycleReport,
    ) {
        let proxy = self.proxy_for(index);
        let session = match self.factory.open(account, proxy, cancel) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to open session for wallet {}", account.address);
                report.failed += 1;
                return;
            }
        };

        info!("Processing wallet: {}", session.address());
        let active = session.check_status().await;
        if cancel.is_cancelled() {
            warn!("Shutdown requested, skipping activation");
            report.failed += 1;
            return;
        }
        if active {
            success!("Node is already active, skipping...");
            report.already_active += 1;
            return;
        }

        info!("Activating node...");
        if session.activate().await {
            success!(detail = session.address(), "Node activated");
            report.activated += 1;
        } else {
            warn!("Node activation not confirmed, will retry next cycle");
            report.failed += 1;
        }
    }
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        3600 => "1 hour".to_string(),
        s if s > 0 && s % 3600 == 0 => format!("{} hours", s / 3600),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

#[async_trait]
impl<F: SessionFactory> Worker for CycleOrchestrator<F> {
    async fn start(&self, cancellation_token: CancellationToken) -> Result<WorkerStats> {
        info!(
            "Running {} wallets with {} proxies",
            self.accounts.len(),
            self.proxies.len()
        );

        let mut stats = WorkerStats::default();
        loop {
            if cancellation_token.is_cancelled() {
                info!("Orchestrator stopping (cancelled).");
                break;
            }

            let report = self.run_cycle(&cancellation_token).await;
            stats.success += report.already_active + report.activated;
            stats.failed += report.failed;
            info!(
                "Cycle summary: {} processed | {} already active | {} activated | {} failed",
                report.processed, report.already_active, report.activated, report.failed
            );

            if self.single_pass {
                break;
            }

            warn!(
                "Cycle completed - Pausing for {}...",
                describe_interval(self.cycle_interval)
            );
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Orchestrator stopping (cancelled during sleep).");
                    break;
                }
                _ = tokio::time::sleep(self.cycle_interval) => {}
            }
        }

        Ok(stats)
    }
}
