//! The single currently-displayed verdict.
//!
//! Last write wins: each new verdict overwrites the singleton, and the UI
//! surface reads it once on mount.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::protocol::TabId;
use crate::store::{read_key, write_key, KeyValueStore, ALERT_DATA_KEY};
use crate::verdict::ScanVerdict;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    pub url: String,
    pub score: u8,
    pub message: String,
    #[serde(rename = "tabId")]
    pub tab_id: TabId,
    #[serde(rename = "aiScore", default)]
    pub ai_score: Option<i64>,
    #[serde(rename = "aiReason", default)]
    pub ai_reason: Option<String>,
    #[serde(rename = "reportCount", default)]
    pub report_count: u32,
}

impl AlertData {
    pub fn from_verdict(url: &str, tab_id: TabId, verdict: &ScanVerdict) -> Self {
        Self {
            url: url.to_string(),
            score: verdict.trust_score,
            message: verdict.alert_message.clone(),
            tab_id,
            ai_score: verdict.ai_score,
            ai_reason: verdict.ai_reason.clone(),
            report_count: verdict.report_count,
        }
    }
}

/// Accessor for the `phisherShieldAlertData` singleton key.
#[derive(Clone)]
pub struct AlertStore {
    store: Arc<dyn KeyValueStore>,
}

impl AlertStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn set(&self, alert: &AlertData) {
        write_key(self.store.as_ref(), ALERT_DATA_KEY, alert).await;
    }

    pub async fn get(&self) -> Option<AlertData> {
        read_key(self.store.as_ref(), ALERT_DATA_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn alert(url: &str, tab_id: TabId) -> AlertData {
        AlertData {
            url: url.to_string(),
            score: 20,
            message: "warning".to_string(),
            tab_id,
            ai_score: None,
            ai_reason: None,
            report_count: 0,
        }
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let alerts = AlertStore::new(Arc::new(MemoryStore::new()));
        assert!(alerts.get().await.is_none());

        alerts.set(&alert("https://a.test/", 1)).await;
        alerts.set(&alert("https://b.test/", 2)).await;

        let current = alerts.get().await.unwrap();
        assert_eq!(current.url, "https://b.test/");
        assert_eq!(current.tab_id, 2);
    }

    #[test]
    fn test_alert_wire_field_names() {
        let json = serde_json::to_value(alert("u", 9)).unwrap();
        assert_eq!(json["tabId"], 9);
        assert_eq!(json["reportCount"], 0);
        assert!(json["aiScore"].is_null());
    }
}
