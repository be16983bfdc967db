//! External AI assessment collector.
//!
//! Calls a configured assessment endpoint with the URL and extracted page
//! text. The signal degrades to absent on failure or after its internal
//! 15-second timeout; the aggregator then simply applies no AI deduction.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{AiAssessment, AiAssessor};

/// Internal timeout for the AI signal, after which it degrades to absent.
pub const AI_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct AiResponse {
    score: i64,
    #[serde(default)]
    reason: Option<String>,
}

pub struct HttpAiAssessor {
    endpoint: Option<String>,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpAiAssessor {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            api_key,
            client,
        }
    }

    async fn fetch(&self, endpoint: &str, url: &str, content: &str) -> Result<AiAssessment, String> {
        let mut request = self
            .client
            .post(endpoint)
            .json(&json!({ "url": url, "content": content }));
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status().as_u16()));
        }

        let parsed: AiResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(AiAssessment {
            score: parsed.score,
            reason: parsed.reason.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl AiAssessor for HttpAiAssessor {
    async fn assess(&self, url: &str, content: &str) -> Option<AiAssessment> {
        let endpoint = self.endpoint.as_deref()?;

        match tokio::time::timeout(AI_TIMEOUT, self.fetch(endpoint, url, content)).await {
            Ok(Ok(assessment)) => {
                tracing::debug!(url, score = assessment.score, "AI assessment received");
                Some(assessment)
            }
            Ok(Err(reason)) => {
                tracing::warn!(url, %reason, "AI assessment failed, signal absent");
                None
            }
            Err(_) => {
                tracing::warn!(url, timeout_secs = AI_TIMEOUT.as_secs(), "AI assessment timed out, signal absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_response_parsing() {
        let parsed: AiResponse =
            serde_json::from_str(r#"{"score":25,"reason":"login form mimics a bank"}"#).unwrap();
        assert_eq!(parsed.score, 25);
        assert_eq!(parsed.reason.as_deref(), Some("login form mimics a bank"));
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint_is_absent() {
        let assessor = HttpAiAssessor::new(None, None, reqwest::Client::new());
        assert!(assessor.assess("https://example.test/", "").await.is_none());
    }
}
