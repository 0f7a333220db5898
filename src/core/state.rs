//! Process state for serve mode.
//!
//! - `SERVING`: initial scene load finished, read endpoint is live
//! - `SHUTDOWN`: Ctrl+C received

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

static SERVING: AtomicBool = AtomicBool::new(false);

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

// =============================================================================
// SERVING state
// =============================================================================

pub fn is_serving() -> bool {
    SERVING.load(Ordering::SeqCst)
}

/// Mark the scene as served (call after the initial load)
pub fn set_serving() {
    SERVING.store(true, Ordering::SeqCst);
}

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_server()`: exit immediately, nothing to tear down
/// - After `register_server()`: unblock the server; `serve` then stops the
///   coordinator and watcher in order
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Request shutdown without a signal (e.g. the coordinator died)
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(server) = SERVER.get() {
        server.unblock();
    }
}
