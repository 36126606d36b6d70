#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use core_logic::{
    Account, HttpExecutor, HttpResponse, Method, NetworkError, ProxyConfig, RequestSpec,
    RetryConfig,
};
use layeredge_node::api::NodeApi;
use layeredge_node::{NodeSession, SessionFactory};
use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// Well-known development keys and their checksummed addresses.
pub const KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ADDR_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const ADDR_1: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const KEY_2: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";
pub const ADDR_2: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";

pub const API_BASE: &str = "https://api.test";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// In-memory stand-in for the LayerEdge API.
pub struct FakeApi {
    active: Mutex<HashSet<String>>,
    status_script: Mutex<VecDeque<Result<HttpResponse, NetworkError>>>,
    activation_reply: Mutex<Result<HttpResponse, NetworkError>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(HashSet::new()),
            status_script: Mutex::new(VecDeque::new()),
            activation_reply: Mutex::new(ok_json(
                r#"{"message":"node action executed successfully"}"#,
            )),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_active(&self, address: &str) {
        self.active.lock().unwrap().insert(address.to_string());
    }

    /// Outcomes served to the next status calls before normal routing resumes.
    pub fn script_status(&self, outcomes: Vec<Result<HttpResponse, NetworkError>>) {
        self.status_script.lock().unwrap().extend(outcomes);
    }

    pub fn set_activation_reply(&self, reply: Result<HttpResponse, NetworkError>) {
        *self.activation_reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url_part: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.contains(url_part))
            .count()
    }
}

#[async_trait]
impl HttpExecutor for FakeApi {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, NetworkError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });

        if request.url.contains("/node-status/") {
            if let Some(outcome) = self.status_script.lock().unwrap().pop_front() {
                return outcome;
            }
            let address = request.url.rsplit('/').next().unwrap_or_default();
            return if self.active.lock().unwrap().contains(address) {
                ok_json(r#"{"data":{"startTimestamp":1718000000}}"#)
            } else {
                ok_json(r#"{"data":{"startTimestamp":null}}"#)
            };
        }

        if request.url.ends_with("/start") {
            return self.activation_reply.lock().unwrap().clone();
        }

        http_error(404, &request.url)
    }
}

pub fn ok_json(body: &str) -> Result<HttpResponse, NetworkError> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn http_error(code: u16, url: &str) -> Result<HttpResponse, NetworkError> {
    Err(NetworkError::HttpError {
        status_code: code,
        endpoint: url.to_string(),
        body: String::new(),
    })
}

pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig::new(max_attempts, Duration::from_millis(1))
        .with_default_backoff(Duration::from_millis(1))
}

pub fn session(
    api: &Arc<FakeApi>,
    retry: RetryConfig,
    private_key: Option<&str>,
) -> NodeSession<Arc<FakeApi>> {
    NodeSession::with_executor(
        api.clone(),
        retry,
        NodeApi::new(API_BASE),
        None,
        private_key,
        CancellationToken::new(),
    )
    .unwrap()
}

/// Opens sessions against a [`FakeApi`] and remembers the proxy each got.
pub struct FakeFactory {
    pub api: Arc<FakeApi>,
    pub retry: RetryConfig,
    pub opened: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeFactory {
    pub fn new(api: Arc<FakeApi>, retry: RetryConfig) -> Self {
        Self {
            api,
            retry,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened_proxies(&self) -> Vec<Option<String>> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl SessionFactory for FakeFactory {
    type Client = NodeSession<Arc<FakeApi>>;

    fn open(
        &self,
        account: &Account,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Self::Client> {
        self.opened
            .lock()
            .unwrap()
            .push((account.address.clone(), proxy.map(|p| p.url())));

        Ok(NodeSession::with_executor(
            self.api.clone(),
            self.retry.clone(),
            NodeApi::new(API_BASE),
            proxy,
            Some(&account.private_key),
            cancel.clone(),
        )?)
    }
}

/// Lets a test keep a handle on the factory it hands to the orchestrator.
pub struct SharedFactory(pub Arc<FakeFactory>);

impl SessionFactory for SharedFactory {
    type Client = NodeSession<Arc<FakeApi>>;

    fn open(
        &self,
        account: &Account,
        proxy: Option<&ProxyConfig>,
        cancel: &CancellationToken,
    ) -> Result<Self::Client> {
        self.0.open(account, proxy, cancel)
    }
}

/// Collects plain-text log output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
