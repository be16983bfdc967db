//! Extension-internal message protocol
//!
//! Every command that crosses the background/surface boundary is one closed
//! enum with a `type` discriminator on the wire. Dispatch is an exhaustive
//! `match`; adding a message type without handling it is a compile error,
//! not a silently dead string branch.

use serde::{Deserialize, Serialize};

/// Browser tab identifier.
pub type TabId = u32;

/// Messages exchanged between the interceptor and a tab's UI surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TabMessage {
    /// Show the warning overlay for the current AlertData. Idempotent.
    #[serde(rename = "displayPhishingAlert")]
    DisplayPhishingAlert,

    /// Remove the warning overlay if present. Idempotent.
    #[serde(rename = "removePhishingAlert")]
    RemovePhishingAlert,

    /// Request the extracted visible text of the current document.
    #[serde(rename = "extractPageContent")]
    ExtractPageContent,

    /// A user decision made on the warning overlay.
    #[serde(rename = "userAction")]
    UserAction {
        action: UserAction,
        #[serde(rename = "originalUrl")]
        original_url: String,
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// A content-side observer saw a same-tab URL change it did not cause.
    #[serde(rename = "detectedRedirect")]
    DetectedRedirect {
        #[serde(rename = "initialUrl")]
        initial_url: String,
        #[serde(rename = "finalUrl")]
        final_url: String,
        #[serde(rename = "redirectType")]
        redirect_type: String,
    },
}

impl TabMessage {
    /// Wire discriminator, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            TabMessage::DisplayPhishingAlert => "displayPhishingAlert",
            TabMessage::RemovePhishingAlert => "removePhishingAlert",
            TabMessage::ExtractPageContent => "extractPageContent",
            TabMessage::UserAction { .. } => "userAction",
            TabMessage::DetectedRedirect { .. } => "detectedRedirect",
        }
    }
}

/// The three decisions a user can make on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Continue,
    Report,
    Block,
}
