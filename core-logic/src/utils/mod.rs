//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod http_client;
pub(crate) mod logger;
pub(crate) mod proxy_manager;
pub(crate) mod retry;
pub(crate) mod runner;
pub(crate) mod wallet_manager;

// Selective exports - only public utilities
pub use http_client::{
    ClientOptions, HttpExecutor, HttpResponse, ReqwestExecutor, RequestSpec, RetryingTransport,
};
pub use logger::{setup_logger, SUCCESS_TARGET};
pub use proxy_manager::ProxyManager;
pub use retry::{with_retry, RetryConfig, RetryDecision};
pub use runner::WorkerRunner;
pub use wallet_manager::WalletManager;
