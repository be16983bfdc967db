//! Google Safe Browsing v4 collector.
//!
//! Neutral default on any failure: empty match list (assume clean).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{SafeBrowsingClient, ThreatMatch};

const GSB_ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";

#[derive(Debug, Deserialize)]
struct GsbResponse {
    #[serde(default)]
    matches: Vec<GsbMatch>,
}

#[derive(Debug, Deserialize)]
struct GsbMatch {
    #[serde(rename = "threatType")]
    threat_type: String,
}

pub struct HttpSafeBrowsingClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpSafeBrowsingClient {
    pub fn new(api_key: Option<String>, client: reqwest::Client) -> Self {
        Self { api_key, client }
    }

    async fn fetch(&self, url: &str, api_key: &str) -> Result<Vec<ThreatMatch>, String> {
        let body = json!({
            "client": { "clientId": "PhisherShield", "clientVersion": "1.0.0" },
            "threatInfo": {
                "threatTypes": [
                    "MALWARE",
                    "SOCIAL_ENGINEERING",
                    "UNWANTED_SOFTWARE",
                    "POTENTIALLY_HARMFUL_APPLICATION"
                ],
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }]
            }
        });

        let response = self
            .client
            .post(GSB_ENDPOINT)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        let parsed: GsbResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ThreatMatch {
                threat_type: m.threat_type,
            })
            .collect())
    }
}

#[async_trait]
impl SafeBrowsingClient for HttpSafeBrowsingClient {
    async fn check(&self, url: &str) -> Vec<ThreatMatch> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(url, "GOOGLE_SAFE_BROWSING_API_KEY not set, assuming clean");
            return Vec::new();
        };

        match self.fetch(url, api_key).await {
            Ok(matches) => {
                if !matches.is_empty() {
                    tracing::debug!(url, count = matches.len(), "Safe Browsing reported threats");
                }
                matches
            }
            Err(reason) => {
                tracing::warn!(url, %reason, "Safe Browsing check failed, assuming clean");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_matches() {
        let parsed: GsbResponse = serde_json::from_str(
            r#"{"matches":[{"threatType":"SOCIAL_ENGINEERING","platformType":"ANY_PLATFORM"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.matches.len(), 1);
        assert_eq!(parsed.matches[0].threat_type, "SOCIAL_ENGINEERING");
    }

    #[test]
    fn test_empty_response_means_clean() {
        // GSB omits "matches" entirely when the URL is clean.
        let parsed: GsbResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.matches.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_assumes_clean() {
        let client = HttpSafeBrowsingClient::new(None, reqwest::Client::new());
        assert!(client.check("https://example.test/").await.is_empty());
    }
}
