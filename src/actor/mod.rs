//! Actor System for live scene sync
//!
//! Message-passing concurrency for serve mode:
//!
//! ```text
//! FsWatcher (thread) ──┐
//!                      ├──SyncMsg──► SyncCoordinator ──► BroadcastHub ──► viewers
//! ws acceptor (thread) ┘            (current_thread rt)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types sent to the coordinator
//! - `fs` - File watcher with debounce and content dedupe
//! - `hub` - Viewer channel registry and fan-out
//! - `coordinator` - Owns the scene; reloads and broadcasts

pub mod coordinator;
pub mod fs;
pub mod hub;
pub mod messages;

pub use coordinator::{SceneSnapshot, SyncCoordinator, sync_channel};
pub use fs::FsWatcher;
