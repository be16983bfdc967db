//! The content-side UI surface of a tab.
//!
//! One `PageSurface` per document. It owns the overlay state machine (at
//! most one live overlay instance, show/hide idempotent), answers page
//! content requests, and runs redirect detection while suppressing the
//! extension's own side effects.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::content::{detect_instant_redirect, detect_meta_refresh, extract_page_text};
use crate::error::{Result, ShieldError};
use crate::messaging::TabTransport;
use crate::protocol::{TabId, TabMessage};

/// How long after an extension-initiated action the redirect detector stays
/// quiet, so the extension never flags its own navigation.
const SUPPRESSION_WINDOW: Duration = Duration::from_secs(1);

pub struct PageSurface {
    url: String,
    html: String,
    overlay_mounted: bool,
    suppressed_at: Option<Instant>,
}

impl PageSurface {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            overlay_mounted: false,
            suppressed_at: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn overlay_mounted(&self) -> bool {
        self.overlay_mounted
    }

    fn suppressed(&self) -> bool {
        self.suppressed_at
            .is_some_and(|at| at.elapsed() < SUPPRESSION_WINDOW)
    }

    fn suppress_own_side_effects(&mut self) {
        self.suppressed_at = Some(Instant::now());
    }

    /// Handle one protocol message. Returns extracted page content for
    /// `extractPageContent`, `None` for everything else.
    pub fn handle(&mut self, message: &TabMessage) -> Option<String> {
        match message {
            TabMessage::DisplayPhishingAlert => {
                if self.overlay_mounted {
                    tracing::debug!(url = %self.url, "overlay already mounted, ignoring display");
                } else {
                    self.overlay_mounted = true;
                    tracing::debug!(url = %self.url, "overlay mounted");
                }
                None
            }
            TabMessage::RemovePhishingAlert => {
                // The removal navigates/settles the page on the extension's
                // behalf; keep the redirect detector quiet.
                self.suppress_own_side_effects();
                if self.overlay_mounted {
                    self.overlay_mounted = false;
                    tracing::debug!(url = %self.url, "overlay removed");
                } else {
                    tracing::debug!(url = %self.url, "no overlay to remove");
                }
                None
            }
            TabMessage::ExtractPageContent => Some(extract_page_text(&self.html)),
            TabMessage::UserAction { .. } => {
                self.suppress_own_side_effects();
                None
            }
            TabMessage::DetectedRedirect { .. } => None,
        }
    }

    /// Run redirect detection for this document. `initial_url` is the URL
    /// navigation started with (empty if unknown). Suppressed entirely
    /// inside the extension-initiated window.
    pub fn detect_redirects(&self, initial_url: &str) -> Vec<TabMessage> {
        if self.suppressed() {
            tracing::debug!(url = %self.url, "redirect detection suppressed (extension-initiated)");
            return Vec::new();
        }

        if let Some(message) = detect_instant_redirect(initial_url, &self.url) {
            // An instant redirect already moved the document; the meta tag
            // of the landing page is the next navigation's business.
            return vec![message];
        }

        detect_meta_refresh(&self.html, &self.url)
            .into_iter()
            .collect()
    }
}

/// Tab → surface map; the background side's view of every attached
/// document. Implements `TabTransport`: sending to a tab without a surface
/// is the retryable "no receiver" failure.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: RwLock<HashMap<TabId, Arc<Mutex<PageSurface>>>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a fresh surface for a newly loaded document, replacing any
    /// previous one for the tab.
    pub async fn attach(&self, tab: TabId, surface: PageSurface) -> Arc<Mutex<PageSurface>> {
        let surface = Arc::new(Mutex::new(surface));
        self.surfaces.write().await.insert(tab, surface.clone());
        surface
    }

    pub async fn detach(&self, tab: TabId) {
        self.surfaces.write().await.remove(&tab);
    }

    pub async fn get(&self, tab: TabId) -> Option<Arc<Mutex<PageSurface>>> {
        self.surfaces.read().await.get(&tab).cloned()
    }
}

#[async_trait]
impl TabTransport for SurfaceRegistry {
    async fn send(&self, tab: TabId, message: &TabMessage) -> Result<()> {
        let surface = self.get(tab).await.ok_or(ShieldError::NoReceiver(tab))?;
        surface.lock().await.handle(message);
        Ok(())
    }

    async fn request_page_content(&self, tab: TabId) -> Result<String> {
        let surface = self.get(tab).await.ok_or(ShieldError::NoReceiver(tab))?;
        let content = surface.lock().await.handle(&TabMessage::ExtractPageContent);
        Ok(content.unwrap_or_default())
    }
}
