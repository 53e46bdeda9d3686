//! Proxy checker module for probing HTTP and SOCKS5 availability

use crate::error::Error;
use crate::proxy::models::{ProxyRecord, ProxyType};
use crate::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument, Span};

/// Default timeout for a single probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test proxies against
pub const DEFAULT_TEST_URL: &str = "https://httpbin.org/ip";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Total timeout for each probe
    pub timeout: Duration,
    /// Maximum probes in flight, unlimited when `None`
    pub concurrency: Option<usize>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: None,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

/// Outcome of probing one proxy over one protocol
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The target answered 200 or 204
    Success(u16),
    Failure(Error),
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }
}

/// A single reachability check of a proxy over one protocol
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(
        &self,
        target_url: &str,
        proxy: &ProxyRecord,
        protocol: ProxyType,
    ) -> ProbeOutcome;
}

/// Probes proxies with a fresh reqwest client per attempt
#[derive(Debug, Clone)]
pub struct ProbeClient {
    timeout: Duration,
    span: Span,
}

impl ProbeClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_span(timeout, tracing::info_span!("probe_client"))
    }

    /// Create a client that logs inside the given span
    pub fn with_span(timeout: Duration, span: Span) -> Self {
        Self { timeout, span }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a reqwest client tunneling every request through the proxy
    fn create_client(&self, proxy: &ProxyRecord, protocol: ProxyType) -> Result<Client> {
        let mut reqwest_proxy = ReqwestProxy::all(proxy.url(protocol))
            .map_err(|e| Error::InvalidProxy(e.to_string()))?;
        if let Some((login, password)) = proxy.credentials() {
            reqwest_proxy = reqwest_proxy.basic_auth(login, password);
        }

        Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::InvalidProxy(e.to_string()))
    }

    async fn execute_request(
        &self,
        target_url: &str,
        proxy: &ProxyRecord,
        protocol: ProxyType,
    ) -> Result<u16> {
        // Dropped on return, which closes the session on every path.
        let client = self.create_client(proxy, protocol)?;

        let response = tokio::time::timeout(self.timeout, client.get(target_url).send())
            .await
            .map_err(|_| Error::ProbeTimeout(self.timeout))?
            .map_err(|e| Error::from_request(e, self.timeout))?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(response.status().as_u16()),
            status => Err(Error::UnexpectedStatus(status.as_u16())),
        }
    }
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl Probe for ProbeClient {
    async fn probe(
        &self,
        target_url: &str,
        proxy: &ProxyRecord,
        protocol: ProxyType,
    ) -> ProbeOutcome {
        async {
            debug!("try request {} proxy: '{}'", protocol, proxy);
            match self.execute_request(target_url, proxy, protocol).await {
                Ok(status) => {
                    debug!("success with {} proxy: '{}': code: {}", protocol, proxy, status);
                    ProbeOutcome::Success(status)
                }
                Err(e) => {
                    warn!("failed with {} proxy '{}': {}", protocol, proxy, e);
                    ProbeOutcome::Failure(e)
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Counts gathered over one coordinator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Records without a usable host or port
    pub skipped: usize,
    /// Probes launched
    pub probes: usize,
    /// Probes that marked a protocol available
    pub available: usize,
}

/// Runs one HTTP and one SOCKS5 probe per proxy and records the results
pub struct ProbeCoordinator<P = ProbeClient> {
    probe: P,
    config: CheckerConfig,
    span: Span,
}

impl ProbeCoordinator<ProbeClient> {
    /// Create a coordinator backed by real network probes
    pub fn with_config(config: CheckerConfig) -> Self {
        let probe = ProbeClient::new(config.timeout);
        Self::with_probe(probe, config)
    }
}

impl<P: Probe> ProbeCoordinator<P> {
    pub fn with_probe(probe: P, config: CheckerConfig) -> Self {
        Self {
            probe,
            config,
            span: tracing::info_span!("probe_coordinator"),
        }
    }

    /// Log inside the given span instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Probe every proxy over both protocols and set its availability flags
    ///
    /// All probes run concurrently within the calling task. A failed or
    /// panicking probe only leaves its own flag unset.
    pub async fn run(&self, proxies: &mut [ProxyRecord], target_url: &str) -> CheckSummary {
        let span = self.span.clone();
        self.run_inner(proxies, target_url).instrument(span).await
    }

    async fn run_inner(&self, proxies: &mut [ProxyRecord], target_url: &str) -> CheckSummary {
        let mut summary = CheckSummary::default();

        let mut tasks = Vec::with_capacity(proxies.len() * ProxyType::ALL.len());
        for (index, proxy) in proxies.iter().enumerate() {
            if !proxy.is_probeable() {
                warn!("invalid proxy, skipping: '{}'", proxy);
                summary.skipped += 1;
                continue;
            }
            tasks.extend(ProxyType::ALL.map(|protocol| (index, protocol, proxy)));
        }

        summary.probes = tasks.len();
        if tasks.is_empty() {
            debug!("no proxies to probe");
            return summary;
        }

        let limit = self.config.concurrency.unwrap_or(tasks.len()).max(1);
        info!(
            "probing {} proxies ({} probes) against {}",
            proxies.len() - summary.skipped,
            summary.probes,
            target_url
        );

        let outcomes: Vec<(usize, ProxyType, ProbeOutcome)> = stream::iter(tasks)
            .map(|(index, protocol, record)| async move {
                let outcome = AssertUnwindSafe(self.probe.probe(target_url, record, protocol))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        ProbeOutcome::Failure(Error::TaskPanicked(panic_message(panic)))
                    });
                (index, protocol, outcome)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        for (index, protocol, outcome) in outcomes {
            let proxy = &mut proxies[index];
            match outcome {
                ProbeOutcome::Success(_) => {
                    proxy.mark_available(protocol);
                    summary.available += 1;
                    debug!("{} proxy protocol type is available: '{}'", protocol, proxy);
                }
                ProbeOutcome::Failure(e) => {
                    warn!(
                        "{} proxy protocol type is not available: '{}': {}",
                        protocol, proxy, e
                    );
                }
            }
        }

        summary
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
