//! WHOIS collector (WhoisXML API).
//!
//! Neutral default on any failure: age 0 ("unknown"), registrar absent.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use super::{WhoisClient, WhoisMetrics};

#[derive(Debug, Deserialize)]
struct WhoisResponse {
    #[serde(rename = "WhoisRecord")]
    whois_record: Option<WhoisRecord>,
}

#[derive(Debug, Deserialize)]
struct WhoisRecord {
    #[serde(rename = "createdDate")]
    created_date: Option<String>,
    #[serde(rename = "registrarName")]
    registrar_name: Option<String>,
}

pub struct HttpWhoisClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpWhoisClient {
    pub fn new(api_key: Option<String>, client: reqwest::Client) -> Self {
        Self { api_key, client }
    }

    async fn fetch(&self, domain: &str, api_key: &str) -> Result<WhoisMetrics, String> {
        let response = self
            .client
            .get("https://www.whoisxmlapi.com/whoisserver/WhoisService")
            .query(&[
                ("domainName", domain),
                ("apiKey", api_key),
                ("outputFormat", "JSON"),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        let body: WhoisResponse = response.json().await.map_err(|e| e.to_string())?;
        let record = body.whois_record.ok_or("no WhoisRecord in response")?;

        let domain_age_days = record
            .created_date
            .as_deref()
            .and_then(|created| age_days(created, Utc::now().date_naive()));

        Ok(WhoisMetrics {
            domain_age_days,
            registrar: record.registrar_name,
        })
    }
}

#[async_trait]
impl WhoisClient for HttpWhoisClient {
    async fn lookup(&self, domain: &str) -> WhoisMetrics {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(domain, "WHOIS_XML_API_KEY not set, using unavailable default");
            return unavailable();
        };

        match self.fetch(domain, api_key).await {
            Ok(metrics) => {
                tracing::debug!(domain, age_days = ?metrics.domain_age_days, "WHOIS lookup succeeded");
                metrics
            }
            Err(reason) => {
                tracing::warn!(domain, %reason, "WHOIS lookup failed, using unavailable default");
                unavailable()
            }
        }
    }
}

fn unavailable() -> WhoisMetrics {
    WhoisMetrics {
        domain_age_days: Some(0),
        registrar: None,
    }
}

/// Days between a WHOIS created-date string and `today`.
///
/// Registries emit a mix of RFC 3339 and bare-date formats; the date part
/// is always the first ten characters in both.
fn age_days(created: &str, today: NaiveDate) -> Option<i64> {
    let date_part = created.get(..10)?;
    let created = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((today - created).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 8).unwrap()
    }

    #[test]
    fn test_age_days_rfc3339() {
        let age = age_days("2026-07-29T00:00:00Z", today()).unwrap();
        assert_eq!(age, 10);
    }

    #[test]
    fn test_age_days_bare_date() {
        let age = age_days("2025-08-08", today()).unwrap();
        assert_eq!(age, 365);
    }

    #[test]
    fn test_age_days_unparseable() {
        assert!(age_days("last tuesday", today()).is_none());
        assert!(age_days("", today()).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_gives_unavailable_default() {
        let client = HttpWhoisClient::new(None, reqwest::Client::new());
        let metrics = client.lookup("example.com").await;
        assert_eq!(metrics.domain_age_days, Some(0));
        assert!(metrics.registrar.is_none());
    }
}
