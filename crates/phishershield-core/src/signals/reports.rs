//! Community report counters.
//!
//! The durable report store is an external collaborator; the pipeline only
//! reads a count per URL. `NoReports` is the neutral default for hosts with
//! no report source; `MemoryReportStore` backs the scan server.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReportCounter;

/// No report source wired in: every URL has zero reports.
pub struct NoReports;

#[async_trait]
impl ReportCounter for NoReports {
    async fn count_for(&self, _url: &str) -> u32 {
        0
    }
}

/// In-memory, session-lifetime report counter.
#[derive(Default)]
pub struct MemoryReportStore {
    counts: RwLock<HashMap<String, u32>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one community report against a URL. Returns the new count.
    pub async fn record(&self, url: &str) -> u32 {
        let mut counts = self.counts.write().await;
        let count = counts.entry(url.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

#[async_trait]
impl ReportCounter for MemoryReportStore {
    async fn count_for(&self, url: &str) -> u32 {
        let counts = self.counts.read().await;
        counts.get(url).copied().unwrap_or(0)
    }
}
