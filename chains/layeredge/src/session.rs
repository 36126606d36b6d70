use crate::api::{
    activation_message, is_activation_confirmed, is_node_active, ActivationRequest, NodeApi,
};
use crate::config::LayerEdgeConfig;
use async_trait::async_trait;
use core_logic::{
    Account, CoreError, HttpExecutor, ProxyConfig, ReqwestExecutor, RequestSpec, RetryConfig,
    RetryingTransport, WalletError,
};
use ethers::signers::{LocalWallet, Signer};
use ethers::utils::to_checksum;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace, warn};

/// The two operations the orchestrator drives for each account.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Checksummed wallet address.
    fn address(&self) -> &str;

    /// Whether the remote node is running. Any failure reads as "not active".
    async fn check_status(&self) -> bool;

    /// Signs and submits an activation request. True only on confirmed success.
    async fn activate(&self) -> bool;
}

pub fn parse_wallet(label: &str, private_key: &str) -> Result<LocalWallet, WalletError> {
    private_key
        .trim()
        .parse::<LocalWallet>()
        .map_err(|e| WalletError::InvalidKey {
            label: label.to_string(),
            reason: e.to_string(),
        })
}

pub fn checksum_address(wallet: &LocalWallet) -> String {
    to_checksum(&wallet.address(), None)
}

/// Checks every account key up front so a bad key fails at startup rather
/// than mid-cycle. A label that disagrees with the derived address is only
/// worth a warning: the derived one is what gets used.
pub fn verify_accounts(accounts: &[Account]) -> Result<(), WalletError> {
    for (i, account) in accounts.iter().enumerate() {
        let label = if account.address.is_empty() {
            format!("#{}", i + 1)
        } else {
            account.address.clone()
        };
        let wallet = parse_wallet(&label, &account.private_key)?;
        let derived = checksum_address(&wallet);

        if !account.address.is_empty() && !account.address.eq_ignore_ascii_case(&derived) {
            let mismatch = WalletError::AddressMismatch {
                expected: account.address.clone(),
                actual: derived,
            };
            warn!("{}", mismatch);
        }
    }
    Ok(())
}

/// One account's identity bound to one transport for the duration of a pass.
pub struct NodeSession<E> {
    wallet: LocalWallet,
    address: String,
    api: NodeApi,
    transport: RetryingTransport<E>,
}

impl NodeSession<ReqwestExecutor> {
    pub fn connect(
        config: &LayerEdgeConfig,
        proxy: Option<&ProxyConfig>,
        private_key: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        let executor = ReqwestExecutor::new(&config.client_options(), proxy)?;
        Self::with_executor(
            executor,
            config.retry_config(),
            NodeApi::new(&config.api_base),
            proxy,
            private_key,
            cancel,
        )
    }
}

impl<E: HttpExecutor> NodeSession<E> {
    /// Without a key a throwaway random wallet is generated.
    pub fn with_executor(
        executor: E,
        retry: RetryConfig,
        api: NodeApi,
        proxy: Option<&ProxyConfig>,
        private_key: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        let wallet = match private_key {
            Some(key) => parse_wallet("session", key)?,
            None => LocalWallet::new(&mut rand::thread_rng()),
        };
        let address = checksum_address(&wallet);

        trace!(
            "Initialized - Wallet: {}, Proxy: {}",
            address,
            proxy.map(|p| p.url()).unwrap_or_else(|| "None".to_string())
        );

        Ok(Self {
            wallet,
            address,
            api,
            transport: RetryingTransport::new(executor, retry, cancel),
        })
    }

    /// Builds the activation body for `timestamp`. The signed message and
    /// the transmitted field share the same value.
    pub async fn sign_activation(&self, timestamp: i64) -> Result<ActivationRequest, WalletError> {
        let message = activation_message(&self.address, timestamp);
        let signature = self
            .wallet
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::SigningFailed {
                reason: e.to_string(),
            })?;

        Ok(ActivationRequest {
            sign: format!("0x{}", signature),
            timestamp,
        })
    }
}

#[async_trait]
impl<E: HttpExecutor> NodeClient for NodeSession<E> {
    fn address(&self) -> &str {
        &self.address
    }

    async fn check_status(&self) -> bool {
        let request = RequestSpec::get(self.api.status_url(&self.address));
        self.transport
            .execute(&request)
            .await
            .and_then(|response| response.json())
            .map(|body| is_node_active(&body))
            .unwrap_or(false)
    }

    async fn activate(&self) -> bool {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let activation = match self.sign_activation(timestamp).await {
            Ok(a) => a,
            Err(e) => {
                error!(error = %e, "Failed to sign activation request");
                return false;
            }
        };

        let body = match serde_json::to_value(&activation) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "Failed to encode activation request");
                return false;
            }
        };

        let request = RequestSpec::post_json(self.api.activation_url(&self.address), body);
        self.transport
            .execute(&request)
            .await
            .and_then(|response| response.json())
            .map(|body| is_activation_confirmed(&body))
            .unwrap_or(false)
    }
}
