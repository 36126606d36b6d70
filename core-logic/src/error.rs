//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Network(NetworkError),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<NetworkError> for CoreError {
    fn from(e: NetworkError) -> Self {
        CoreError::Network(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid URL format: '{url}'")]
    InvalidUrl { url: String },

    #[error("Unsupported proxy scheme '{scheme}' in '{uri}'")]
    UnsupportedProxyScheme { scheme: String, uri: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Wallet and cryptographic operation errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("No wallets found in {path}")]
    Empty { path: String },

    #[error("Invalid wallet file {path}: {reason}")]
    InvalidFormat { path: String, reason: String },

    #[error("Invalid private key for wallet {label}: {reason}")]
    InvalidKey { label: String, reason: String },

    #[error("Wallet address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: String, actual: String },

    #[error("Message signing failed: {reason}")]
    SigningFailed { reason: String },
}

/// Network and HTTP-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("Connection refused to {endpoint}: {reason}")]
    ConnectionRefused { endpoint: String, reason: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError {
        status_code: u16,
        endpoint: String,
        body: String,
    },

    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },
}

impl NetworkError {
    /// HTTP status code, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetworkError::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Multi-line detail for the error log field: status, URL and response body.
    pub fn detail(&self) -> String {
        match self {
            NetworkError::HttpError {
                status_code,
                endpoint,
                body,
            } => format!(
                "{}\n  Status: {}\n  URL: {}\n  Response: {}",
                self,
                status_code,
                endpoint,
                if body.is_empty() { "{}" } else { body }
            ),
            other => other.to_string(),
        }
    }
}
