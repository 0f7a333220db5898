//! Actor Message Definitions
//!
//! ```text
//! FsWatcher ──SceneChanged/ScriptChanged──┐
//!                                          ├──► SyncCoordinator
//! ws acceptor ─────────Connect────────────┘
//! ```

use std::fmt;
use std::path::PathBuf;

use super::hub::ViewerChannel;

/// Messages to the SyncCoordinator
pub enum SyncMsg {
    /// Scene file content changed (already deduplicated)
    SceneChanged { path: PathBuf },
    /// Generator script content changed
    ScriptChanged { path: PathBuf },
    /// A viewer channel finished its handshake
    Connect(Box<dyn ViewerChannel>),
    /// Close viewers and stop
    Shutdown,
}

impl fmt::Debug for SyncMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SceneChanged { path } => f
                .debug_struct("SceneChanged")
                .field("path", path)
                .finish(),
            Self::ScriptChanged { path } => f
                .debug_struct("ScriptChanged")
                .field("path", path)
                .finish(),
            Self::Connect(_) => f.write_str("Connect(..)"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
