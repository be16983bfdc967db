//! Navigation interceptor: the per-tab pipeline.
//!
//! Triggered once per top-level navigation to an http/https URL that is not
//! the extension's own surface. Never cancels navigation: the warning is
//! advisory and rendered after the page starts loading. Per tab, the order
//! cache write → AlertData write → message dispatch is sequential.

use std::sync::Arc;

use crate::alert::{AlertData, AlertStore};
use crate::cache::{CacheEntry, ScanCache};
use crate::config::ShieldConfig;
use crate::gateway::ScanGateway;
use crate::messaging::{send_with_retry, send_with_retry_budget, TabTransport};
use crate::protocol::{TabId, TabMessage, UserAction};
use crate::store::KeyValueStore;
use crate::tracker::{BypassTracker, RedirectRecord, RedirectTracker};
use crate::util::now_millis;
use crate::verdict::{ScanRequest, ScanVerdict};

/// Retry budget for overlay removal: one attempt suffices, since removal is
/// idempotent and an unattached surface has nothing to remove.
const REMOVE_RETRIES: u32 = 1;

/// What the host should do after a user decision. The interceptor updates
/// its own state; driving the browser is the host's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserActionOutcome {
    /// Let the page proceed; nothing else to do.
    Resumed,
    /// Open the report page in a new tab.
    OpenReportPage(String),
    /// Replace the tab's document with a blank page.
    BlockNavigation { replacement_url: String },
}

pub struct NavigationInterceptor {
    cache: ScanCache,
    redirects: RedirectTracker,
    bypass: BypassTracker,
    alerts: AlertStore,
    gateway: Arc<dyn ScanGateway>,
    transport: Arc<dyn TabTransport>,
    report_page_url: String,
    own_surface_prefix: Option<String>,
}

impl NavigationInterceptor {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn ScanGateway>,
        transport: Arc<dyn TabTransport>,
        config: &ShieldConfig,
    ) -> Self {
        Self {
            cache: ScanCache::new(store.clone()),
            redirects: RedirectTracker::new(store.clone()),
            bypass: BypassTracker::new(),
            alerts: AlertStore::new(store),
            gateway,
            transport,
            report_page_url: config.report_page_url.clone(),
            own_surface_prefix: config.own_surface_prefix.clone(),
        }
    }

    /// One top-level (main-frame) navigation in a tab.
    pub async fn on_navigation(&self, tab: TabId, url: &str) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return;
        }
        if let Some(prefix) = &self.own_surface_prefix {
            if url.starts_with(prefix.as_str()) {
                return;
            }
        }
        if self.bypass.contains(tab) {
            tracing::debug!(tab, url, "tab bypassed, skipping interception");
            return;
        }

        let now = now_millis();
        let verdict = match self.cache.lookup(url, now).await {
            Some(entry) => entry.to_verdict(),
            None => {
                let redirect_type = self
                    .redirects
                    .take(tab)
                    .await
                    .map(|record| record.redirect_type);
                let request = ScanRequest {
                    url: url.to_string(),
                    page_content: String::new(),
                    redirect_type,
                };
                let verdict = self.gateway.scan(&request).await;
                self.cache
                    .insert(CacheEntry::from_verdict(url, &verdict, now))
                    .await;
                verdict
            }
        };

        self.publish(tab, url, &verdict).await;
    }

    /// The tab's top-level navigation committed: interception resumes.
    pub fn on_committed(&self, tab: TabId) {
        self.bypass.clear(tab);
    }

    /// A user decision from the warning overlay. The tab is bypassed until
    /// its next committed navigation so the user's own choice does not
    /// re-trigger the same warning.
    pub async fn on_user_action(
        &self,
        tab: TabId,
        action: UserAction,
        original_url: &str,
    ) -> UserActionOutcome {
        tracing::info!(tab, ?action, url = original_url, "user action on overlay");
        self.bypass.insert(tab);
        send_with_retry_budget(
            self.transport.as_ref(),
            tab,
            &TabMessage::RemovePhishingAlert,
            REMOVE_RETRIES,
        )
        .await;

        match action {
            UserAction::Continue => UserActionOutcome::Resumed,
            UserAction::Report => UserActionOutcome::OpenReportPage(self.report_url(original_url)),
            UserAction::Block => UserActionOutcome::BlockNavigation {
                replacement_url: "about:blank".to_string(),
            },
        }
    }

    /// A content-side detector saw a same-tab redirect; remember it for the
    /// next interception of that tab.
    pub async fn on_detected_redirect(
        &self,
        tab: TabId,
        initial_url: String,
        final_url: String,
        redirect_type: String,
    ) {
        self.redirects
            .record(
                tab,
                RedirectRecord {
                    initial_url,
                    final_url,
                    redirect_type,
                    timestamp: now_millis(),
                },
            )
            .await;
    }

    /// Dispatch for messages addressed to the background side.
    pub async fn on_message(&self, message: TabMessage) -> Option<UserActionOutcome> {
        match message {
            TabMessage::UserAction {
                action,
                original_url,
                tab_id,
            } => Some(self.on_user_action(tab_id, action, &original_url).await),
            TabMessage::DetectedRedirect {
                initial_url,
                final_url,
                redirect_type,
            } => {
                // The detector does not know its tab id on the wire; hosts
                // that do should call on_detected_redirect directly.
                tracing::warn!(
                    %initial_url,
                    %final_url,
                    %redirect_type,
                    "detectedRedirect without tab context, dropped"
                );
                None
            }
            // Surface-addressed messages are not ours to handle.
            TabMessage::DisplayPhishingAlert
            | TabMessage::RemovePhishingAlert
            | TabMessage::ExtractPageContent => None,
        }
    }

    /// On-demand scan with page content (the popup's "scan this page").
    /// Refreshes the cache and AlertData; does not touch the overlay.
    pub async fn manual_scan(&self, tab: TabId, url: &str) -> ScanVerdict {
        let page_content = match self.transport.request_page_content(tab).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(tab, error = %e, "page content unavailable, scanning without it");
                String::new()
            }
        };

        let request = ScanRequest {
            url: url.to_string(),
            page_content,
            redirect_type: None,
        };
        let verdict = self.gateway.scan(&request).await;

        self.cache
            .insert(CacheEntry::from_verdict(url, &verdict, now_millis()))
            .await;
        self.alerts
            .set(&AlertData::from_verdict(url, tab, &verdict))
            .await;
        verdict
    }

    async fn publish(&self, tab: TabId, url: &str, verdict: &ScanVerdict) {
        self.alerts
            .set(&AlertData::from_verdict(url, tab, verdict))
            .await;

        if verdict.is_suspicious() {
            tracing::info!(tab, url, score = verdict.trust_score, "suspicious, requesting overlay");
            send_with_retry(
                self.transport.as_ref(),
                tab,
                &TabMessage::DisplayPhishingAlert,
            )
            .await;
        } else {
            tracing::debug!(tab, url, score = verdict.trust_score, "safe, clearing overlay");
            send_with_retry_budget(
                self.transport.as_ref(),
                tab,
                &TabMessage::RemovePhishingAlert,
                REMOVE_RETRIES,
            )
            .await;
        }
    }

    fn report_url(&self, original_url: &str) -> String {
        match url::Url::parse_with_params(&self.report_page_url, &[("url", original_url)]) {
            Ok(report_url) => report_url.to_string(),
            Err(_) => self.report_page_url.clone(),
        }
    }
}
