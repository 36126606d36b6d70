use anyhow::{anyhow, Result};
use config::{Config, Environment, File};
use core_logic::{ClientOptions, ConfigError, RetryConfig};
use serde::Deserialize;
use std::time::Duration;

fn default_api_base() -> String {
    "https://referralapi.layeredge.io".to_string()
}
fn default_web_origin() -> String {
    "https://layeredge.io".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}
fn default_wallets_file() -> String {
    core_logic::WalletManager::WALLETS_FILE.to_string()
}
fn default_proxy_file() -> String {
    core_logic::ProxyManager::PROXY_FILE.to_string()
}
fn default_cycle_interval_secs() -> u64 {
    3600
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_max_attempts() -> u32 {
    30
}
fn default_backoff_secs() -> u64 {
    2
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayerEdgeConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_web_origin")]
    pub web_origin: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_wallets_file")]
    pub wallets_file: String,
    #[serde(default = "default_proxy_file")]
    pub proxy_file: String,
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait after an HTTP 500.
    #[serde(default = "default_backoff_secs")]
    pub server_error_backoff_secs: u64,
    /// Wait after any other failed attempt.
    #[serde(default = "default_backoff_secs")]
    pub retry_backoff_secs: u64,
    #[serde(default)]
    pub fail_fast_on_client_error: bool,
    #[serde(default = "default_true")]
    pub verbose: bool,
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LayerEdgeConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            web_origin: default_web_origin(),
            user_agent: default_user_agent(),
            wallets_file: default_wallets_file(),
            proxy_file: default_proxy_file(),
            cycle_interval_secs: default_cycle_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            server_error_backoff_secs: default_backoff_secs(),
            retry_backoff_secs: default_backoff_secs(),
            fail_fast_on_client_error: false,
            verbose: true,
            log_dir: None,
        }
    }
}

impl LayerEdgeConfig {
    /// Loads `path` if it exists, then applies `LAYEREDGE_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("LAYEREDGE").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize().map_err(|e| anyhow!(e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        for url in [&self.api_base, &self.web_origin] {
            if url::Url::parse(url).is_err() {
                return Err(ConfigError::InvalidUrl { url: url.clone() });
            }
        }
        Ok(())
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.max_attempts,
            Duration::from_secs(self.server_error_backoff_secs),
        )
        .with_default_backoff(Duration::from_secs(self.retry_backoff_secs))
        .with_fail_fast_on_client_error(self.fail_fast_on_client_error)
    }

    /// Fixed headers and timeout shared by every request.
    pub fn client_options(&self) -> ClientOptions {
        let origin = self.web_origin.trim_end_matches('/');
        ClientOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            headers: vec![
                ("User-Agent".to_string(), self.user_agent.clone()),
                ("Origin".to_string(), origin.to_string()),
                ("Referer".to_string(), format!("{}/", origin)),
            ],
        }
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.cycle_interval_secs)
    }
}
