//! Viewer Message Protocol
//!
//! JSON text frames pushed to connected viewers.
//!
//! # Message Types
//!
//! - `connected`: sent once when a channel joins
//! - `scene_updated`: the scene changed; re-fetch it from the read endpoint
//! - `error`: a reload or generator run failed; the previous scene stays

use serde::{Deserialize, Serialize};

/// Message sent to viewers over a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// A new scene snapshot is available
    SceneUpdated,

    /// Reload or generator failure (display overlay, scene unchanged)
    Error { error: String },
}

impl ViewerMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"scene_updated"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
