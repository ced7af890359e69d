//! Messages exchanged between the page and the service worker.
//!
//! Both directions use a JSON object tagged by `type`.

use serde::{Deserialize, Serialize};

/// Page → worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Activate the waiting worker now.
    SkipWaiting,
}

impl WorkerMessage {
    /// Parse a message, returning None for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognised worker message");
                None
            }
        }
    }
}

/// Worker → page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// A new version finished installing and is waiting.
    UpdateAvailable { version: String },
    /// A version took control.
    Activated { version: String },
}
