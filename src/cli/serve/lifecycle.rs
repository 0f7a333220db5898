//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::Server;
use tokio::sync::mpsc;

use crate::actor::SyncCoordinator;
use crate::actor::messages::SyncMsg;
use crate::core::{request_shutdown, set_serving};
use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// How long shutdown waits for each background thread.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// Run the coordinator on its own thread with a single-threaded runtime.
///
/// The initial load happens there too; the read endpoint answers 503 until
/// it is done. When the coordinator stops, the whole server stops.
pub fn spawn_coordinator(mut coordinator: SyncCoordinator) -> Result<JoinHandle<()>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let handle = thread::Builder::new()
        .name("volum-sync".into())
        .spawn(move || {
            rt.block_on(async move {
                coordinator.initial_load().await;
                set_serving();
                coordinator.run().await;
            });
            request_shutdown();
        })
        .context("Failed to spawn coordinator thread")?;

    Ok(handle)
}

/// Stop the coordinator and wait (bounded) for background threads.
pub fn shutdown(sync_tx: mpsc::Sender<SyncMsg>, handles: Vec<JoinHandle<()>>) {
    request_shutdown();
    // With a full inbox the coordinator stops once every sender is gone.
    let _ = sync_tx.try_send(SyncMsg::Shutdown);
    drop(sync_tx);

    for handle in handles {
        wait_for(handle);
    }
}

fn wait_for(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("worker").to_string();
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;

    while waited < JOIN_TIMEOUT {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(step);
        waited += step;
    }
    crate::debug!("serve"; "{} did not stop in time", name);
}
