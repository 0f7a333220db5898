//! WebSocket Server for viewer channels
//!
//! Accepts connections on its own thread, performs the handshake there and
//! hands the upgraded, non-blocking socket to the SyncCoordinator.

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::actor::messages::SyncMsg;
use crate::{debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Handshake must finish within this time.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep between non-blocking accept attempts.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Start the acceptor thread. Returns the port actually bound.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    sync_tx: mpsc::Sender<SyncMsg>,
) -> Result<(u16, JoinHandle<()>)> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    let handle = std::thread::Builder::new()
        .name("volum-ws".into())
        .spawn(move || accept_loop(listener, sync_tx))?;

    Ok((actual_port, handle))
}

fn accept_loop(listener: TcpListener, sync_tx: mpsc::Sender<SyncMsg>) {
    loop {
        if crate::core::is_shutdown() || sync_tx.is_closed() {
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("ws"; "client connecting: {}", addr);
                let Some(ws) = handshake(stream) else {
                    continue;
                };
                if sync_tx.blocking_send(SyncMsg::Connect(Box::new(ws))).is_err() {
                    debug!("ws"; "coordinator gone, stopping acceptor");
                    break;
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                log!("ws"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_POLL);
            }
        }
    }
    debug!("ws"; "acceptor stopped");
}

/// Blocking handshake, then switch to non-blocking for the hub.
fn handshake(stream: TcpStream) -> Option<tungstenite::WebSocket<TcpStream>> {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));

    match tungstenite::accept(stream) {
        Ok(ws) => {
            let _ = ws.get_ref().set_read_timeout(None);
            if let Err(e) = ws.get_ref().set_nonblocking(true) {
                log!("ws"; "failed to switch socket to non-blocking: {}", e);
                return None;
            }
            Some(ws)
        }
        Err(e) => {
            log!("ws"; "handshake failed: {}", e);
            None
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                if offset > 0 {
                    log!("ws"; "port {} in use, using {} instead", base_port, actual_port);
                }
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use tungstenite::Message;

    use super::*;
    use crate::actor::hub::ViewerChannel;
    use crate::reload::message::ViewerMessage;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_try_bind_port_skips_busy_port() {
        let (busy, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        assert_ne!(port, 0);

        let (_next, next_port) = try_bind_port(LOCALHOST, port, 3).unwrap();
        assert_ne!(next_port, port);
        drop(busy);
    }

    #[test]
    fn test_accepted_socket_reaches_coordinator() {
        let (tx, mut rx) = mpsc::channel(4);
        let (port, _handle) = start_ws_server(LOCALHOST, 0, tx).unwrap();

        let (mut client, _) =
            tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();

        let Some(SyncMsg::Connect(mut channel)) = rx.blocking_recv() else {
            panic!("expected a Connect message");
        };
        channel.deliver(&ViewerMessage::SceneUpdated).unwrap();

        let frame = client.read().unwrap();
        let Message::Text(text) = frame else {
            panic!("expected a text frame, got {frame:?}");
        };
        assert_eq!(
            ViewerMessage::from_json(&text),
            Some(ViewerMessage::SceneUpdated)
        );

        drop(rx);
    }
}
