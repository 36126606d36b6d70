//! # Core Logic - Shared Utilities for Account Bots
//!
//! This crate provides shared utilities used across all chain implementations.
//! It includes the retrying HTTP transport, proxy and wallet loading, logging,
//! and the worker runner.
//!
//! ## Modules
//!
//! - [`config`] - Account and proxy configuration types
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (transport, retry, proxy, wallet, logger)

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::{Account, ProxyConfig, ProxyScheme};
pub use error::{ConfigError, CoreError, NetworkError, WalletError};
pub use reqwest::Method;
pub use traits::{Worker, WorkerStats};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    setup_logger, with_retry, ClientOptions, HttpExecutor, HttpResponse, ProxyManager,
    ReqwestExecutor, RequestSpec, RetryConfig, RetryDecision, RetryingTransport, WalletManager,
    WorkerRunner, SUCCESS_TARGET,
};
