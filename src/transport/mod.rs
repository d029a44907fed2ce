//! Outbound side of the chat bridge.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller hands frames to a `Transport` and never waits on it.
//! `ChannelTransport` queues into a bounded mpsc channel drained by a writer
//! task (`ws`); the local bot (`crate::bot`) implements the trait directly.
//! Inbound frames always arrive on a separate `mpsc::Receiver<Frame>` that
//! the adapter owns.

pub mod ws;

use frames::Frame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Capacity of the frame channels between the controller and socket tasks.
pub const FRAME_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error("outbound queue full")]
    Full,
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
}

/// Non-blocking frame sink.
pub trait Transport {
    /// Queue a frame for delivery.
    fn send(&mut self, frame: Frame) -> Result<(), TransportError>;
}

/// Transport backed by a bounded mpsc channel.
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Frame>,
}

impl ChannelTransport {
    /// Create a transport plus the receiver that drains it.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.tx.try_send(frame).map_err(|error| match error {
            TrySendError::Full(_) => TransportError::Full,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
