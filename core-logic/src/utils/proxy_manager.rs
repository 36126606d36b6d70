use crate::config::ProxyConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Read-only proxy pool, assigned to accounts round-robin.
#[derive(Debug, Clone, Default)]
pub struct ProxyManager {
    proxies: Vec<ProxyConfig>,
}

impl ProxyManager {
    pub const PROXY_FILE: &'static str = "proxy.txt";

    pub fn new(proxies: Vec<ProxyConfig>) -> Self {
        Self { proxies }
    }

    /// Loads proxies from a newline-delimited file.
    ///
    /// A missing or unreadable file is not fatal: the bot runs without proxies.
    pub fn load_proxies(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("{} not found. Running without proxies.", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                error!(error = %e, "Failed to read file: {}", path.display());
                return Self::default();
            }
        };

        let manager = Self::parse(&content);
        info!(
            "Loaded {} proxies from {}",
            manager.len(),
            path.display()
        );
        manager
    }

    pub fn parse(content: &str) -> Self {
        let mut proxies = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match ProxyConfig::parse(line) {
                Ok(proxy) => proxies.push(proxy),
                Err(e) => warn!("Skipping invalid proxy line: {}", e),
            }
        }

        Self { proxies }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Proxy for the account at `index`, or `None` when the pool is empty.
    pub fn for_index(&self, index: usize) -> Option<&ProxyConfig> {
        if self.proxies.is_empty() {
            None
        } else {
            self.proxies.get(index % self.proxies.len())
        }
    }
}
