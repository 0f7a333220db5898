//! WebSocket viewer channel.
//!
//! The handshake happens on the acceptor thread; by the time a socket gets
//! here it is upgraded and switched to non-blocking mode.

use std::io::ErrorKind;
use std::net::TcpStream;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::{DeliveryError, ViewerChannel};
use crate::reload::message::ViewerMessage;

/// Frames drained per `poll_closed` call.
const MAX_READS_PER_POLL: usize = 16;

fn would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

impl ViewerChannel for WebSocket<TcpStream> {
    fn deliver(&mut self, message: &ViewerMessage) -> Result<(), DeliveryError> {
        match self.send(Message::Text(message.to_json().into())) {
            Ok(()) => Ok(()),
            // Frame is buffered; the next send or flush writes it out.
            Err(ref e) if would_block(e) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Err(DeliveryError::Closed)
            }
            Err(e) => Err(DeliveryError::Transport(e.to_string())),
        }
    }

    fn poll_closed(&mut self) -> bool {
        for _ in 0..MAX_READS_PER_POLL {
            match self.read() {
                Ok(Message::Close(_)) => return true,
                // Viewers have nothing to say; pings are answered internally.
                Ok(_) => continue,
                Err(ref e) if would_block(e) => return false,
                Err(_) => return true,
            }
        }
        false
    }

    fn close(&mut self) {
        let _ = WebSocket::close(self, None);
        let _ = self.flush();
    }
}
