//! Broadcast Hub - viewer channel registry and fan-out
//!
//! Owned by the SyncCoordinator, so it is never locked. A channel whose
//! delivery fails is dropped on the spot; the others still get the message.
//!
//! ```text
//! SyncCoordinator --broadcast--> BroadcastHub --deliver--> [ws, ws, mpsc, ...]
//! ```

mod delivery;


use thiserror::Error;
use tokio::sync::mpsc;

use crate::debug;
use crate::reload::message::ViewerMessage;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel closed")]
    Closed,
    #[error("transport error: {0}")]
    Transport(String),
}

/// One connected viewer.
pub trait ViewerChannel: Send {
    /// Push a message. An error means the channel is gone.
    fn deliver(&mut self, message: &ViewerMessage) -> Result<(), DeliveryError>;

    /// Non-blocking check whether the peer went away.
    fn poll_closed(&mut self) -> bool {
        false
    }

    /// Best-effort goodbye on shutdown.
    fn close(&mut self) {}
}

impl ViewerChannel for mpsc::UnboundedSender<ViewerMessage> {
    fn deliver(&mut self, message: &ViewerMessage) -> Result<(), DeliveryError> {
        self.send(message.clone()).map_err(|_| DeliveryError::Closed)
    }

    fn poll_closed(&mut self) -> bool {
        self.is_closed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

#[derive(Default)]
pub struct BroadcastHub {
    channels: Vec<(ChannelId, Box<dyn ViewerChannel>)>,
    next_id: u64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, channel: Box<dyn ViewerChannel>) -> ChannelId {
        let id = ChannelId(self.next_id);
        self.next_id += 1;
        self.channels.push((id, channel));
        debug!("ws"; "viewer connected (total: {})", self.channels.len());
        id
    }

    /// Returns `false` if `id` was not connected.
    pub fn disconnect(&mut self, id: ChannelId) -> bool {
        let before = self.channels.len();
        self.channels.retain(|(cid, _)| *cid != id);
        before != self.channels.len()
    }

    /// Deliver to one channel, dropping it on failure.
    pub fn send_to(&mut self, id: ChannelId, message: &ViewerMessage) -> bool {
        let Some(pos) = self.channels.iter().position(|(cid, _)| *cid == id) else {
            return false;
        };
        match self.channels[pos].1.deliver(message) {
            Ok(()) => true,
            Err(e) => {
                debug!("ws"; "viewer dropped: {}", e);
                self.channels.remove(pos);
                false
            }
        }
    }

    /// Deliver to every channel. Returns how many accepted the message.
    pub fn broadcast(&mut self, message: &ViewerMessage) -> usize {
        if self.channels.is_empty() {
            debug!("ws"; "no viewers connected");
            return 0;
        }

        self.channels
            .retain_mut(|(_, channel)| match channel.deliver(message) {
                Ok(()) => true,
                Err(e) => {
                    debug!("ws"; "viewer dropped: {}", e);
                    false
                }
            });
        debug!("ws"; "broadcast to {} viewers", self.channels.len());
        self.channels.len()
    }

    /// Drop channels whose peer has gone away.
    pub fn reap(&mut self) -> usize {
        let before = self.channels.len();
        self.channels.retain_mut(|(_, channel)| !channel.poll_closed());
        let reaped = before - self.channels.len();
        if reaped > 0 {
            debug!("ws"; "reaped {} closed viewers", reaped);
        }
        reaped
    }

    pub fn close_all(&mut self) {
        for (_, mut channel) in self.channels.drain(..) {
            channel.close();
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
