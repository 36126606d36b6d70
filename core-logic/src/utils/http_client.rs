use crate::config::ProxyConfig;
use crate::error::{ConfigError, CoreError, NetworkError};
use crate::utils::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One outbound call. Fixed headers, timeout and proxy belong to the executor.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Body parsed as JSON; `None` when it is not JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Sends a single request. Non-2xx answers are errors.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, NetworkError>;
}

#[async_trait]
impl<T: HttpExecutor + ?Sized> HttpExecutor for Arc<T> {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, NetworkError> {
        (**self).send(request).await
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            headers: Vec::new(),
        }
    }
}

pub struct ReqwestExecutor {
    client: Client,
    timeout: Duration,
}

impl ReqwestExecutor {
    pub fn new(options: &ClientOptions, proxy: Option<&ProxyConfig>) -> Result<Self, CoreError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            default_headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .timeout(options.timeout)
            .default_headers(default_headers);

        if let Some(proxy_config) = proxy {
            builder = builder.proxy(proxy_config.to_reqwest_proxy()?);
            debug!("HTTP client using proxy: {}", proxy_config.url());
        }

        let client = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "http_client".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> NetworkError {
        if e.is_timeout() {
            NetworkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                endpoint: url.to_string(),
            }
        } else if e.is_connect() {
            NetworkError::ConnectionRefused {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            NetworkError::RequestFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ConfigError::InvalidValue {
            field: format!("header {}", name),
            reason: e.to_string(),
        }
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidValue {
        field: format!("header {}", name),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, NetworkError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            let (name, value) = parse_header(name, value).map_err(|e| {
                NetworkError::RequestFailed {
                    endpoint: request.url.clone(),
                    reason: e.to_string(),
                }
            })?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(&request.url, e))?;

        if status.is_success() {
            Ok(HttpResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(NetworkError::HttpError {
                status_code: status.as_u16(),
                endpoint: request.url.clone(),
                body,
            })
        }
    }
}

/// Executes requests with bounded retries and per-class backoff.
pub struct RetryingTransport<E> {
    executor: E,
    retry: RetryConfig,
    cancel: CancellationToken,
}

impl<E: HttpExecutor> RetryingTransport<E> {
    pub fn new(executor: E, retry: RetryConfig, cancel: CancellationToken) -> Self {
        Self {
            executor,
            retry,
            cancel,
        }
    }

    /// `None` means the request did not complete within the allowed attempts.
    pub async fn execute(&self, request: &RequestSpec) -> Option<HttpResponse> {
        let response = with_retry(&self.retry, &request.url, &self.cancel, || {
            self.executor.send(request)
        })
        .await?;

        trace!("Request successful - Status {}", response.status);
        Some(response)
    }
}
