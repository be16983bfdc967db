//! Error types for phishershield-core

use thiserror::Error;

use crate::protocol::TabId;

/// Errors that can occur in the interception pipeline.
///
/// Most of these never reach a user: signal failures collapse into neutral
/// defaults, storage failures are treated as cache misses, and delivery
/// failures are retried and then dropped. The variants exist so the seams
/// can report *why* they degraded.
#[derive(Debug, Error)]
pub enum ShieldError {
    /// Persistent key-value store access failure
    #[error("storage access failed for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// No UI surface is attached to the target tab (retryable)
    #[error("no receiving surface attached to tab {0}")]
    NoReceiver(TabId),

    /// Message delivery to a tab's surface failed permanently
    /// (anything other than a missing receiver; not retried)
    #[error("message delivery to tab {tab} failed: {reason}")]
    Delivery { tab: TabId, reason: String },

    /// Serialization/deserialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ShieldError {
    /// True if a send should be retried (the surface may attach shortly).
    pub fn is_retryable_send(&self) -> bool {
        matches!(self, ShieldError::NoReceiver(_))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ShieldError>;
