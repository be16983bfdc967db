//! Scan cache: short-lived memoization of verdicts, keyed by exact URL.
//!
//! TTL is measured from write time. The read path is a staleness check;
//! there is no background eviction; a stale entry just loses to the next
//! fresh write. Concurrent navigations to the same URL can race on the
//! key; last writer wins, and both writers computed the same deterministic
//! score.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{read_key, write_key, KeyValueStore, SCAN_CACHE_KEY};
use crate::verdict::ScanVerdict;

/// Cache lifetime: five minutes from write.
pub const SCAN_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

/// One cached verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub score: u8,
    pub message: String,
    #[serde(rename = "aiScore", default)]
    pub ai_score: Option<i64>,
    #[serde(rename = "aiReason", default)]
    pub ai_reason: Option<String>,
    #[serde(default)]
    pub deductions: Vec<String>,
    /// Milliseconds since epoch at write time.
    pub timestamp: u64,
}

impl CacheEntry {
    pub fn from_verdict(url: &str, verdict: &ScanVerdict, timestamp: u64) -> Self {
        Self {
            url: url.to_string(),
            score: verdict.trust_score,
            message: verdict.alert_message.clone(),
            ai_score: verdict.ai_score,
            ai_reason: verdict.ai_reason.clone(),
            deductions: verdict.deductions.clone(),
            timestamp,
        }
    }

    pub fn is_fresh(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) < SCAN_CACHE_TTL_MS
    }

    /// Rehydrate the verdict this entry was written from. The report count
    /// is not cached; a cache hit reads as zero until the next fresh scan.
    pub fn to_verdict(&self) -> ScanVerdict {
        ScanVerdict {
            trust_score: self.score,
            alert_message: self.message.clone(),
            deductions: self.deductions.clone(),
            ai_score: self.ai_score,
            ai_reason: self.ai_reason.clone(),
            report_count: 0,
        }
    }
}

/// The URL → CacheEntry map behind the `scanCache` store key.
#[derive(Clone)]
pub struct ScanCache {
    store: Arc<dyn KeyValueStore>,
}

impl ScanCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A fresh entry for the exact URL, or `None` (miss or stale).
    pub async fn lookup(&self, url: &str, now_ms: u64) -> Option<CacheEntry> {
        let map: HashMap<String, CacheEntry> =
            read_key(self.store.as_ref(), SCAN_CACHE_KEY).await?;
        let entry = map.get(url)?;
        if entry.is_fresh(now_ms) {
            tracing::debug!(url, age_ms = now_ms.saturating_sub(entry.timestamp), "scan cache hit");
            Some(entry.clone())
        } else {
            tracing::debug!(url, "scan cache entry stale");
            None
        }
    }

    /// Write (or overwrite) the entry for its URL.
    pub async fn insert(&self, entry: CacheEntry) {
        let mut map: HashMap<String, CacheEntry> =
            read_key(self.store.as_ref(), SCAN_CACHE_KEY)
                .await
                .unwrap_or_default();
        map.insert(entry.url.clone(), entry);
        write_key(self.store.as_ref(), SCAN_CACHE_KEY, &map).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn entry(url: &str, timestamp: u64) -> CacheEntry {
        CacheEntry {
            url: url.to_string(),
            score: 95,
            message: "ok".to_string(),
            ai_score: None,
            ai_reason: None,
            deductions: Vec::new(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_reused_at_four_minutes() {
        let cache = ScanCache::new(Arc::new(MemoryStore::new()));
        let t0 = 1_000_000;
        cache.insert(entry("https://a.test/", t0)).await;

        let four_min = t0 + 4 * 60 * 1000;
        let hit = cache.lookup("https://a.test/", four_min).await.unwrap();
        assert_eq!(hit.score, 95);
    }

    #[tokio::test]
    async fn test_stale_entry_misses_at_six_minutes() {
        let cache = ScanCache::new(Arc::new(MemoryStore::new()));
        let t0 = 1_000_000;
        cache.insert(entry("https://a.test/", t0)).await;

        let six_min = t0 + 6 * 60 * 1000;
        assert!(cache.lookup("https://a.test/", six_min).await.is_none());
    }

    #[tokio::test]
    async fn test_exact_url_keying() {
        let cache = ScanCache::new(Arc::new(MemoryStore::new()));
        cache.insert(entry("https://a.test/", 0)).await;
        assert!(cache.lookup("https://a.test/x", 1).await.is_none());
        assert!(cache.lookup("https://a.test", 1).await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_on_refresh() {
        let cache = ScanCache::new(Arc::new(MemoryStore::new()));
        cache.insert(entry("https://a.test/", 0)).await;
        let mut refreshed = entry("https://a.test/", 10);
        refreshed.score = 40;
        cache.insert(refreshed).await;

        let hit = cache.lookup("https://a.test/", 20).await.unwrap();
        assert_eq!(hit.score, 40);
        assert_eq!(hit.timestamp, 10);
    }

    #[test]
    fn test_entry_wire_field_names() {
        let entry = CacheEntry {
            url: "u".to_string(),
            score: 1,
            message: "m".to_string(),
            ai_score: Some(2),
            ai_reason: Some("r".to_string()),
            deductions: vec!["d".to_string()],
            timestamp: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["aiScore"], 2);
        assert_eq!(json["aiReason"], "r");
        assert_eq!(json["timestamp"], 3);
    }
}
