use crate::config::Account;
use crate::error::WalletError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct WalletManager;

impl WalletManager {
    pub const WALLETS_FILE: &'static str = "wallets.json";

    /// Loads the account list. Every failure here is fatal for the caller:
    /// a missing, unparseable or empty file yields an error.
    pub fn load_accounts(path: impl AsRef<Path>) -> Result<Vec<Account>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let accounts = Self::parse_accounts(&content, &path.display().to_string())?;
        info!("Loaded {} wallets from {}", accounts.len(), path.display());
        Ok(accounts)
    }

    pub fn parse_accounts(content: &str, source: &str) -> Result<Vec<Account>, WalletError> {
        let accounts: Vec<Account> =
            serde_json::from_str(content).map_err(|e| WalletError::InvalidFormat {
                path: source.to_string(),
                reason: e.to_string(),
            })?;

        if accounts.is_empty() {
            return Err(WalletError::Empty {
                path: source.to_string(),
            });
        }

        Ok(accounts)
    }
}
