//! SPF/DMARC posture collector.
//!
//! TXT lookups go over DNS-over-HTTPS so the collector rides the same HTTP
//! stack as every other signal. Resolution failure leaves both records
//! absent (which the aggregator penalizes for HTTPS destinations).

use async_trait::async_trait;
use serde::Deserialize;

use super::{DnsAuth, DnsAuthResolver};
use crate::util::base_domain;

const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google/resolve";
const TXT_RECORD_TYPE: &str = "16";

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    data: String,
}

pub struct DohDnsAuthResolver {
    endpoint: String,
    client: reqwest::Client,
}

impl DohDnsAuthResolver {
    pub fn new(endpoint: Option<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_DOH_ENDPOINT.to_string()),
            client,
        }
    }

    async fn txt_records(&self, name: &str) -> Result<Vec<String>, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", name), ("type", TXT_RECORD_TYPE)])
            .header("Accept", "application/dns-json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        let parsed: DohResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(parsed.answer.into_iter().map(|a| a.data).collect())
    }

    async fn has_txt_prefix(&self, name: &str, prefix: &str) -> bool {
        match self.txt_records(name).await {
            Ok(records) => records_have_prefix(&records, prefix),
            Err(reason) => {
                tracing::warn!(name, %reason, "TXT lookup failed, record considered absent");
                false
            }
        }
    }
}

#[async_trait]
impl DnsAuthResolver for DohDnsAuthResolver {
    async fn verify(&self, domain: &str) -> DnsAuth {
        let root = base_domain(domain);
        let dmarc_name = format!("_dmarc.{root}");

        let (has_spf, has_dmarc) = tokio::join!(
            self.has_txt_prefix(&root, "v=spf1"),
            self.has_txt_prefix(&dmarc_name, "v=dmarc1"),
        );

        tracing::debug!(domain, %root, has_spf, has_dmarc, "DNS auth verified");
        DnsAuth { has_spf, has_dmarc }
    }
}

/// DoH TXT answers arrive quoted and sometimes chunked; strip quotes before
/// the case-insensitive prefix test.
fn records_have_prefix(records: &[String], prefix: &str) -> bool {
    records.iter().any(|record| {
        record
            .trim_matches('"')
            .to_lowercase()
            .starts_with(prefix)
    })
}
