//! Scan request and verdict types: the wire contract of the pipeline.

use serde::{Deserialize, Serialize};

/// One scan of one URL. Created per navigation or per manual scan,
/// consumed once by the scoring pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub url: String,

    /// Extracted visible page text; empty for pre-load scans.
    #[serde(rename = "content", default)]
    pub page_content: String,

    /// Redirect type consumed from the tab's RedirectRecord, if any.
    #[serde(rename = "redirectType", default)]
    pub redirect_type: Option<String>,
}

impl ScanRequest {
    /// Pre-load scan: no page content, no redirect context.
    pub fn pre_load(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_content: String::new(),
            redirect_type: None,
        }
    }
}

/// Output of the pure aggregator: a clamped score and the ordered
/// human-readable reasons for every deduction that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub deductions: Vec<String>,
}

/// The backend gateway's response to a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanVerdict {
    #[serde(rename = "trustScore")]
    pub trust_score: u8,

    #[serde(rename = "alertMessage")]
    pub alert_message: String,

    #[serde(default)]
    pub deductions: Vec<String>,

    #[serde(rename = "geminiAiScore", default)]
    pub ai_score: Option<i64>,

    #[serde(rename = "geminiAiReason", default)]
    pub ai_reason: Option<String>,

    #[serde(rename = "reportCount", default)]
    pub report_count: u32,
}

/// Scores below this threshold trigger the warning overlay.
pub const ALERT_THRESHOLD: u8 = 50;

impl ScanVerdict {
    /// True if this verdict should show the overlay.
    pub fn is_suspicious(&self) -> bool {
        self.trust_score < ALERT_THRESHOLD
    }

    /// Fail-closed verdict for a backend that answered with an error status.
    pub fn server_error() -> Self {
        Self::failed("Failed to scan site: Server error.")
    }

    /// Fail-closed verdict for a backend that could not be reached.
    pub fn network_error() -> Self {
        Self::failed("Failed to scan site: Network error.")
    }

    /// Fail-closed verdict for a URL with no parseable host.
    /// Unknown is treated as dangerous: score 0, overlay shown.
    pub fn invalid_url() -> Self {
        Self {
            trust_score: 0,
            alert_message: "Invalid URL format provided.".to_string(),
            deductions: vec!["Malformed or unparseable URL (-100)".to_string()],
            ai_score: None,
            ai_reason: None,
            report_count: 0,
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            trust_score: 0,
            alert_message: message.to_string(),
            deductions: Vec::new(),
            ai_score: None,
            ai_reason: None,
            report_count: 0,
        }
    }
}

/// Build the user-facing alert message for a computed score.
pub fn alert_message(score: u8, deductions: &[String]) -> String {
    if score >= 80 {
        "This site appears highly trustworthy. ✅".to_string()
    } else if score >= ALERT_THRESHOLD {
        format!(
            "This site has some minor concerns. Score: {score}. Deductions: {}. 🤔",
            deductions.join(", ")
        )
    } else {
        format!(
            "WARNING: This site is suspicious! Score: {score}. Deductions: {}. 🚨",
            deductions.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_wire_field_names() {
        let verdict = ScanVerdict {
            trust_score: 42,
            alert_message: "m".to_string(),
            deductions: vec!["d".to_string()],
            ai_score: Some(55),
            ai_reason: Some("r".to_string()),
            report_count: 3,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["trustScore"], 42);
        assert_eq!(json["alertMessage"], "m");
        assert_eq!(json["geminiAiScore"], 55);
        assert_eq!(json["geminiAiReason"], "r");
        assert_eq!(json["reportCount"], 3);
    }

    #[test]
    fn test_verdict_optional_fields_default() {
        let verdict: ScanVerdict =
            serde_json::from_str(r#"{"trustScore": 90, "alertMessage": "ok"}"#).unwrap();
        assert_eq!(verdict.trust_score, 90);
        assert!(verdict.deductions.is_empty());
        assert!(verdict.ai_score.is_none());
        assert_eq!(verdict.report_count, 0);
    }

    #[test]
    fn test_scan_request_wire_field_names() {
        let req = ScanRequest {
            url: "https://example.test/".to_string(),
            page_content: "body".to_string(),
            redirect_type: Some("meta_refresh".to_string()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["content"], "body");
        assert_eq!(json["redirectType"], "meta_refresh");
    }

    #[test]
    fn test_suspicion_threshold() {
        assert!(ScanVerdict::server_error().is_suspicious());
        let mut verdict = ScanVerdict::server_error();
        verdict.trust_score = 50;
        assert!(!verdict.is_suspicious());
        verdict.trust_score = 49;
        assert!(verdict.is_suspicious());
    }

    #[test]
    fn test_alert_message_tiers() {
        assert!(alert_message(80, &[]).contains("highly trustworthy"));
        let msg = alert_message(60, &["Missing SPF record (-10)".to_string()]);
        assert!(msg.contains("minor concerns"));
        assert!(msg.contains("Score: 60"));
        let msg = alert_message(20, &["Flagged by Google Safe Browsing (-50)".to_string()]);
        assert!(msg.starts_with("WARNING"));
        assert!(msg.contains("Flagged by Google Safe Browsing (-50)"));
    }

    #[test]
    fn test_fail_closed_messages_exact() {
        assert_eq!(
            ScanVerdict::server_error().alert_message,
            "Failed to scan site: Server error."
        );
        assert_eq!(
            ScanVerdict::network_error().alert_message,
            "Failed to scan site: Network error."
        );
        assert_eq!(
            ScanVerdict::invalid_url().alert_message,
            "Invalid URL format provided."
        );
    }
}
