//! Reliable-enough delivery of protocol messages to a tab's UI surface.
//!
//! The surface may not be attached yet when a verdict arrives (the document
//! is still loading), so sends are retried a bounded number of times with
//! exponential backoff and then dropped with a log line; delivery failure
//! is never escalated to a user-visible error.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{TabId, TabMessage};

/// Transport to a tab's UI surface.
#[async_trait]
pub trait TabTransport: Send + Sync {
    /// One delivery attempt. `ShieldError::NoReceiver` means the surface is
    /// not attached (yet) and the send may be retried.
    async fn send(&self, tab: TabId, message: &TabMessage) -> Result<()>;

    /// Request/response: the extracted visible text of the tab's document.
    async fn request_page_content(&self, tab: TabId) -> Result<String>;
}

/// Retry budget for a normal send.
pub const MAX_SEND_RETRIES: u32 = 3;
/// Delay before the first retry; each subsequent retry waits ×1.5 longer.
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const BACKOFF_FACTOR: f64 = 1.5;

/// Send with the full retry budget.
pub async fn send_with_retry(transport: &dyn TabTransport, tab: TabId, message: &TabMessage) {
    send_with_retry_budget(transport, tab, message, MAX_SEND_RETRIES).await;
}

/// Send with an explicit retry budget. Bounded iterative loop (attempt,
/// sleep, escalate the delay), never recursion.
pub async fn send_with_retry_budget(
    transport: &dyn TabTransport,
    tab: TabId,
    message: &TabMessage,
    retries: u32,
) {
    let mut delay = INITIAL_BACKOFF;
    let mut attempt = 0u32;

    loop {
        match transport.send(tab, message).await {
            Ok(()) => {
                tracing::debug!(tab, kind = message.kind(), attempt, "message delivered");
                return;
            }
            Err(e) if e.is_retryable_send() && attempt < retries => {
                attempt += 1;
                tracing::debug!(
                    tab,
                    kind = message.kind(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "surface not attached, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(BACKOFF_FACTOR);
            }
            Err(e) => {
                tracing::warn!(tab, kind = message.kind(), error = %e, "message delivery failed, dropping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShieldError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Fails with NoReceiver until `succeed_after` attempts have been made.
    struct FlakyTransport {
        attempts: AtomicU32,
        succeed_after: u32,
        delivered: Arc<AtomicU32>,
    }

    impl FlakyTransport {
        fn new(succeed_after: u32) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_after,
                delivered: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait]
    impl TabTransport for FlakyTransport {
        async fn send(&self, tab: TabId, _message: &TabMessage) -> Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.succeed_after {
                Err(ShieldError::NoReceiver(tab))
            } else {
                self.delivered.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        async fn request_page_content(&self, tab: TabId) -> Result<String> {
            Err(ShieldError::NoReceiver(tab))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_after_late_attach() {
        let transport = FlakyTransport::new(2);
        send_with_retry(&transport, 1, &TabMessage::DisplayPhishingAlert).await;
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(transport.delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drops_after_exhausting_budget() {
        let transport = FlakyTransport::new(u32::MAX);
        send_with_retry(&transport, 1, &TabMessage::DisplayPhishingAlert).await;
        // Initial attempt plus three retries, then dropped silently.
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 4);
        assert_eq!(transport.delivered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule() {
        let transport = FlakyTransport::new(u32::MAX);
        let start = Instant::now();
        send_with_retry(&transport, 1, &TabMessage::DisplayPhishingAlert).await;
        // 200ms + 300ms + 450ms of virtual sleep.
        assert_eq!(start.elapsed(), Duration::from_millis(950));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_retry_budget() {
        let transport = FlakyTransport::new(u32::MAX);
        send_with_retry_budget(&transport, 1, &TabMessage::RemovePhishingAlert, 1).await;
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_on_immediate_success() {
        let transport = FlakyTransport::new(0);
        send_with_retry(&transport, 1, &TabMessage::RemovePhishingAlert).await;
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }
}
