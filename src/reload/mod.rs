//! Viewer notification transport.
//!
//! ```text
//! ws acceptor --Connect--> SyncCoordinator --ViewerMessage--> viewers
//! ```
//!
//! - `message` - JSON frames pushed to viewers (connected, scene_updated, error)
//! - `server` - WebSocket acceptor thread

pub mod message;
pub mod server;
