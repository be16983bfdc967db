//! Bypass and redirect state, keyed by tab.
//!
//! Both sets are transient. The bypass set lives in process memory for the
//! session; redirect records go through the persistent store so the
//! content-side detector and the interceptor agree on exactly-once
//! consumption.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::protocol::TabId;
use crate::store::{read_key, write_key, KeyValueStore, DETECTED_REDIRECTS_KEY};

/// Tabs currently permitted to skip interception.
///
/// A tab enters on any user decision (continue/report/block) and leaves when
/// its next top-level navigation commits, so the user's own voluntary
/// navigation never re-triggers the warning it just dismissed.
#[derive(Default)]
pub struct BypassTracker {
    tabs: Mutex<HashSet<TabId>>,
}

impl BypassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tab: TabId) {
        self.tabs.lock().unwrap().insert(tab);
        tracing::debug!(tab, "bypass flag set");
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.tabs.lock().unwrap().contains(&tab)
    }

    /// Called when the tab's top-level navigation commits.
    pub fn clear(&self, tab: TabId) {
        if self.tabs.lock().unwrap().remove(&tab) {
            tracing::debug!(tab, "bypass flag cleared on commit");
        }
    }
}

/// A same-tab URL change observed by the content side, not caused by the
/// extension itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectRecord {
    #[serde(rename = "initialUrl")]
    pub initial_url: String,
    #[serde(rename = "finalUrl")]
    pub final_url: String,
    #[serde(rename = "redirectType")]
    pub redirect_type: String,
    pub timestamp: u64,
}

/// Tab → RedirectRecord map behind the `detectedRedirects` store key.
///
/// A record is consumed (read-then-deleted) at most once. `take` does not
/// check staleness: a record that missed its interception is consumed by
/// the next one for that tab, or never.
#[derive(Clone)]
pub struct RedirectTracker {
    store: Arc<dyn KeyValueStore>,
}

impl RedirectTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, tab: TabId, record: RedirectRecord) {
        let mut map: HashMap<TabId, RedirectRecord> =
            read_key(self.store.as_ref(), DETECTED_REDIRECTS_KEY)
                .await
                .unwrap_or_default();
        tracing::debug!(tab, redirect_type = %record.redirect_type, "redirect recorded");
        map.insert(tab, record);
        write_key(self.store.as_ref(), DETECTED_REDIRECTS_KEY, &map).await;
    }

    /// Read and delete the tab's pending record, if any.
    pub async fn take(&self, tab: TabId) -> Option<RedirectRecord> {
        let mut map: HashMap<TabId, RedirectRecord> =
            read_key(self.store.as_ref(), DETECTED_REDIRECTS_KEY).await?;
        let record = map.remove(&tab)?;
        write_key(self.store.as_ref(), DETECTED_REDIRECTS_KEY, &map).await;
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn record(redirect_type: &str) -> RedirectRecord {
        RedirectRecord {
            initial_url: "https://a.test/".to_string(),
            final_url: "https://b.test/".to_string(),
            redirect_type: redirect_type.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_bypass_lifecycle() {
        let bypass = BypassTracker::new();
        assert!(!bypass.contains(1));

        bypass.insert(1);
        assert!(bypass.contains(1));
        assert!(!bypass.contains(2));

        bypass.clear(1);
        assert!(!bypass.contains(1));
        // Clearing an absent tab is a no-op.
        bypass.clear(1);
    }

    #[tokio::test]
    async fn test_redirect_consumed_exactly_once() {
        let tracker = RedirectTracker::new(Arc::new(MemoryStore::new()));
        tracker.record(7, record("meta_refresh")).await;

        let taken = tracker.take(7).await.unwrap();
        assert_eq!(taken.redirect_type, "meta_refresh");
        assert!(tracker.take(7).await.is_none());
    }

    #[tokio::test]
    async fn test_redirects_keyed_per_tab() {
        let tracker = RedirectTracker::new(Arc::new(MemoryStore::new()));
        tracker.record(1, record("instant_onload")).await;
        tracker.record(2, record("meta_refresh")).await;

        assert_eq!(tracker.take(2).await.unwrap().redirect_type, "meta_refresh");
        assert_eq!(
            tracker.take(1).await.unwrap().redirect_type,
            "instant_onload"
        );
    }

    #[tokio::test]
    async fn test_rerecord_overwrites() {
        let tracker = RedirectTracker::new(Arc::new(MemoryStore::new()));
        tracker.record(1, record("instant_onload")).await;
        tracker.record(1, record("meta_refresh")).await;
        assert_eq!(tracker.take(1).await.unwrap().redirect_type, "meta_refresh");
    }

    #[test]
    fn test_record_wire_field_names() {
        let json = serde_json::to_value(record("instant_onload")).unwrap();
        assert_eq!(json["initialUrl"], "https://a.test/");
        assert_eq!(json["finalUrl"], "https://b.test/");
        assert_eq!(json["redirectType"], "instant_onload");
    }
}
