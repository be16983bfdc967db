//! Signal collectors: the uniform, failure-tolerant contract to every
//! external trust signal.
//!
//! Each collector is infallible by signature: on remote failure (missing
//! credential, network error, non-2xx) it logs and returns its documented
//! neutral default. Individual outages never crash the pipeline; their
//! absence still shows up as a deduction where the data implies one.

pub mod ai;
pub mod dns_auth;
pub mod ip_reputation;
pub mod reports;
pub mod safe_browsing;
pub mod ssl;
pub mod whois;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// WHOIS-derived domain facts.
///
/// `domain_age_days` of `Some(0)` is the unavailable default: "unknown",
/// penalized only by what the number itself implies. `None` means the
/// registry answered but the created date was unparseable (no age penalty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisMetrics {
    pub domain_age_days: Option<i64>,
    pub registrar: Option<String>,
}

/// One Safe Browsing threat-list hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatMatch {
    pub threat_type: String,
}

/// IP reputation facts. Unavailable default: score 0, not whitelisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpReputation {
    pub abuse_confidence_score: u32,
    pub is_whitelisted: bool,
}

/// Email-auth DNS posture. Resolution failure leaves both records absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsAuth {
    pub has_spf: bool,
    pub has_dmarc: bool,
}

/// External AI assessment of the destination. Absent when the signal
/// degraded (failure or its 15-second internal timeout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    pub score: i64,
    pub reason: String,
}

/// Aggregated, possibly-partial evidence for one scan. Every field is
/// independently defaulted; absence means "collector failed", never an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBundle {
    pub whois: WhoisMetrics,
    pub safe_browsing_matches: Vec<ThreatMatch>,
    pub ssl_valid: bool,
    pub ip_reputation: IpReputation,
    pub dns_auth: DnsAuth,
    pub ai: Option<AiAssessment>,
    pub report_count: u32,
}

impl SignalBundle {
    /// A bundle with every signal in its best state. Test aid.
    pub fn clean() -> Self {
        Self {
            whois: WhoisMetrics {
                domain_age_days: Some(3650),
                registrar: Some("Example Registrar Inc.".to_string()),
            },
            safe_browsing_matches: Vec::new(),
            ssl_valid: true,
            ip_reputation: IpReputation::default(),
            dns_auth: DnsAuth {
                has_spf: true,
                has_dmarc: true,
            },
            ai: None,
            report_count: 0,
        }
    }
}

#[async_trait]
pub trait WhoisClient: Send + Sync {
    async fn lookup(&self, domain: &str) -> WhoisMetrics;
}

#[async_trait]
pub trait SafeBrowsingClient: Send + Sync {
    async fn check(&self, url: &str) -> Vec<ThreatMatch>;
}

#[async_trait]
pub trait SslProbe: Send + Sync {
    async fn check(&self, url: &str) -> bool;
}

#[async_trait]
pub trait IpReputationClient: Send + Sync {
    async fn check(&self, domain: &str) -> IpReputation;
}

#[async_trait]
pub trait DnsAuthResolver: Send + Sync {
    async fn verify(&self, domain: &str) -> DnsAuth;
}

#[async_trait]
pub trait AiAssessor: Send + Sync {
    async fn assess(&self, url: &str, content: &str) -> Option<AiAssessment>;
}

/// Community report counts. The durable report store is an external
/// collaborator; this is its read interface.
#[async_trait]
pub trait ReportCounter: Send + Sync {
    async fn count_for(&self, url: &str) -> u32;
}

/// Credentials and endpoints for the concrete collector clients.
/// Every field is optional: a missing key degrades that signal to its
/// neutral default instead of failing startup.
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    pub whois_api_key: Option<String>,
    pub safe_browsing_api_key: Option<String>,
    pub abuse_ipdb_api_key: Option<String>,
    pub ai_endpoint: Option<String>,
    pub ai_api_key: Option<String>,
    pub doh_endpoint: Option<String>,
}

impl CollectorConfig {
    pub fn from_env() -> Self {
        fn optional_env(key: &str) -> Option<String> {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            whois_api_key: optional_env("WHOIS_XML_API_KEY"),
            safe_browsing_api_key: optional_env("GOOGLE_SAFE_BROWSING_API_KEY"),
            abuse_ipdb_api_key: optional_env("ABUSE_IPDB_API_KEY"),
            ai_endpoint: optional_env("AI_ENDPOINT"),
            ai_api_key: optional_env("AI_API_KEY"),
            doh_endpoint: optional_env("DOH_ENDPOINT"),
        }
    }
}

/// The full collector set used by the scan service.
#[derive(Clone)]
pub struct Collectors {
    pub whois: Arc<dyn WhoisClient>,
    pub safe_browsing: Arc<dyn SafeBrowsingClient>,
    pub ssl: Arc<dyn SslProbe>,
    pub ip_reputation: Arc<dyn IpReputationClient>,
    pub dns_auth: Arc<dyn DnsAuthResolver>,
    pub ai: Arc<dyn AiAssessor>,
    pub reports: Arc<dyn ReportCounter>,
}

impl Collectors {
    /// Build the reqwest-backed clients from config. Signals without
    /// credentials stay wired in and answer with their neutral defaults.
    pub fn from_config(config: &CollectorConfig, client: reqwest::Client) -> Self {
        Self {
            whois: Arc::new(whois::HttpWhoisClient::new(
                config.whois_api_key.clone(),
                client.clone(),
            )),
            safe_browsing: Arc::new(safe_browsing::HttpSafeBrowsingClient::new(
                config.safe_browsing_api_key.clone(),
                client.clone(),
            )),
            ssl: Arc::new(ssl::HttpSslProbe::new(client.clone())),
            ip_reputation: Arc::new(ip_reputation::HttpIpReputationClient::new(
                config.abuse_ipdb_api_key.clone(),
                client.clone(),
            )),
            dns_auth: Arc::new(dns_auth::DohDnsAuthResolver::new(
                config.doh_endpoint.clone(),
                client.clone(),
            )),
            ai: Arc::new(ai::HttpAiAssessor::new(
                config.ai_endpoint.clone(),
                config.ai_api_key.clone(),
                client,
            )),
            reports: Arc::new(reports::NoReports),
        }
    }

    /// Replace the report counter (the server wires in its own store).
    pub fn with_reports(mut self, reports: Arc<dyn ReportCounter>) -> Self {
        self.reports = reports;
        self
    }

    /// Collect every signal for one scan. Collectors run concurrently;
    /// each degrades independently, so this never fails.
    pub async fn gather(&self, url: &str, domain: &str, content: &str) -> SignalBundle {
        let (whois, safe_browsing_matches, ssl_valid, dns_auth, ip_reputation, ai, report_count) =
            tokio::join!(
                self.whois.lookup(domain),
                self.safe_browsing.check(url),
                self.ssl.check(url),
                self.dns_auth.verify(domain),
                self.ip_reputation.check(domain),
                self.ai.assess(url, content),
                self.reports.count_for(url),
            );

        SignalBundle {
            whois,
            safe_browsing_matches,
            ssl_valid,
            ip_reputation,
            dns_auth,
            ai,
            report_count,
        }
    }
}
