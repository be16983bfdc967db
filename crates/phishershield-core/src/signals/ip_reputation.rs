//! IP reputation collector (AbuseIPDB).
//!
//! Resolves the domain's address first; then asks AbuseIPDB for its abuse
//! confidence score. Neutral default on any failure: score 0, not
//! whitelisted.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

use super::{IpReputation, IpReputationClient};

const ABUSE_IPDB_ENDPOINT: &str = "https://api.abuseipdb.com/api/v2/check";
const MAX_AGE_IN_DAYS: &str = "90";

#[derive(Debug, Deserialize)]
struct AbuseResponse {
    data: AbuseData,
}

#[derive(Debug, Deserialize)]
struct AbuseData {
    #[serde(rename = "abuseConfidenceScore", default)]
    abuse_confidence_score: u32,
    #[serde(rename = "isWhitelisted", default)]
    is_whitelisted: Option<bool>,
}

pub struct HttpIpReputationClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpIpReputationClient {
    pub fn new(api_key: Option<String>, client: reqwest::Client) -> Self {
        Self { api_key, client }
    }

    async fn resolve(&self, domain: &str) -> Option<IpAddr> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((domain, 443))
            .await
            .ok()?
            .map(|sa| sa.ip())
            .collect();
        // Prefer an IPv4 address, matching what reputation databases index.
        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or(addrs.first())
            .copied()
    }

    async fn fetch(&self, ip: IpAddr, api_key: &str) -> Result<IpReputation, String> {
        let response = self
            .client
            .get(ABUSE_IPDB_ENDPOINT)
            .header("Key", api_key)
            .header("Accept", "application/json")
            .query(&[
                ("ipAddress", ip.to_string().as_str()),
                ("maxAgeInDays", MAX_AGE_IN_DAYS),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        let parsed: AbuseResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(IpReputation {
            abuse_confidence_score: parsed.data.abuse_confidence_score,
            is_whitelisted: parsed.data.is_whitelisted.unwrap_or(false),
        })
    }
}

#[async_trait]
impl IpReputationClient for HttpIpReputationClient {
    async fn check(&self, domain: &str) -> IpReputation {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(domain, "ABUSE_IPDB_API_KEY not set, skipping IP reputation");
            return IpReputation::default();
        };

        let Some(ip) = self.resolve(domain).await else {
            tracing::warn!(domain, "domain did not resolve, skipping IP reputation");
            return IpReputation::default();
        };

        match self.fetch(ip, api_key).await {
            Ok(reputation) => {
                tracing::debug!(domain, %ip, score = reputation.abuse_confidence_score, "IP reputation fetched");
                reputation
            }
            Err(reason) => {
                tracing::warn!(domain, %ip, %reason, "IP reputation check failed, defaulting to clean");
                IpReputation::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abuse_response_parsing() {
        let parsed: AbuseResponse = serde_json::from_str(
            r#"{"data":{"abuseConfidenceScore":87,"isWhitelisted":false,"totalReports":412}}"#,
        )
        .unwrap();
        assert_eq!(parsed.data.abuse_confidence_score, 87);
        assert_eq!(parsed.data.is_whitelisted, Some(false));
    }

    #[test]
    fn test_abuse_response_null_whitelist() {
        // AbuseIPDB returns null for isWhitelisted on unlisted ranges.
        let parsed: AbuseResponse =
            serde_json::from_str(r#"{"data":{"abuseConfidenceScore":0,"isWhitelisted":null}}"#)
                .unwrap();
        assert_eq!(parsed.data.is_whitelisted, None);
    }

    #[tokio::test]
    async fn test_missing_key_gives_clean_default() {
        let client = HttpIpReputationClient::new(None, reqwest::Client::new());
        assert_eq!(client.check("example.com").await, IpReputation::default());
    }
}
