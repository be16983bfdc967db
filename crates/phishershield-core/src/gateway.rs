//! Backend gateway: where a navigation's score actually comes from.
//!
//! `HttpScanGateway` talks to a running scan server over the §6 wire
//! contract. `ScanService` is the gateway's internals: collectors +
//! aggregator + alert wording, usable in-process (the scan server and the
//! CLI both embed it). Both fail closed: a gateway that cannot answer
//! yields score 0, and unknown is treated as dangerous.

use async_trait::async_trait;

use crate::score;
use crate::signals::Collectors;
use crate::verdict::{alert_message, ScanRequest, ScanVerdict};

#[async_trait]
pub trait ScanGateway: Send + Sync {
    /// Score one request. Infallible by contract: failures collapse into a
    /// fail-closed verdict rather than an error.
    async fn scan(&self, request: &ScanRequest) -> ScanVerdict;
}

/// HTTP client for a remote scan server.
pub struct HttpScanGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpScanGateway {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/api/scan", base_url.trim_end_matches('/')),
            client,
        }
    }
}

#[async_trait]
impl ScanGateway for HttpScanGateway {
    async fn scan(&self, request: &ScanRequest) -> ScanVerdict {
        let response = match self.client.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "scan server unreachable");
                return ScanVerdict::network_error();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %request.url, status = status.as_u16(), "scan server returned error status");
            return ScanVerdict::server_error();
        }

        match response.json::<ScanVerdict>().await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "scan server response unreadable");
                ScanVerdict::server_error()
            }
        }
    }
}

/// The gateway internals: gather signals, aggregate, word the alert.
#[derive(Clone)]
pub struct ScanService {
    collectors: Collectors,
}

impl ScanService {
    pub fn new(collectors: Collectors) -> Self {
        Self { collectors }
    }

    pub async fn scan(&self, request: &ScanRequest) -> ScanVerdict {
        let Some(domain) = host_of(&request.url) else {
            tracing::warn!(url = %request.url, "no parseable host, failing closed");
            return ScanVerdict::invalid_url();
        };

        let signals = self
            .collectors
            .gather(&request.url, &domain, &request.page_content)
            .await;
        let result = score::evaluate(request, &signals);

        tracing::debug!(
            url = %request.url,
            score = result.score,
            deductions = result.deductions.len(),
            "scan completed"
        );

        ScanVerdict {
            alert_message: alert_message(result.score, &result.deductions),
            trust_score: result.score,
            deductions: result.deductions,
            ai_score: signals.ai.as_ref().map(|ai| ai.score),
            ai_reason: signals.ai.as_ref().map(|ai| ai.reason.clone()),
            report_count: signals.report_count,
        }
    }
}

#[async_trait]
impl ScanGateway for ScanService {
    async fn scan(&self, request: &ScanRequest) -> ScanVerdict {
        ScanService::scan(self, request).await
    }
}

fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_string())
}
