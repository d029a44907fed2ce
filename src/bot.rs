//! Simulated local chat partner.
//!
//! `LocalBot` stands in for the server in the offline variant of the widget.
//! Every chat line it is sent produces one canned reply after a fixed delay;
//! lock requests are answered immediately with a `chat:status` frame, so any
//! local user can lock the room. A winner announcement is answered the way
//! the server does it: the announcement, a lock, then a payment reset.
//! Replies are scheduled on spawned tasks and dropping the bot aborts the
//! ones still pending.

use std::time::Duration;

use frames::{Frame, syscall};
use rand::seq::IndexedRandom;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::transport::{Transport, TransportError};

pub const BOT_ID: &str = "local-bot";
pub const BOT_NAME: &str = "Bot";

const DEFAULT_REPLIES: &[&str] = &[
    "Thanks for your message!",
    "Good luck in the next draw.",
    "Noted. Anything else?",
    "The room is listening.",
];

pub struct LocalBot {
    inbound: mpsc::Sender<Frame>,
    delay: Duration,
    replies: Vec<String>,
    pending: Vec<JoinHandle<()>>,
}

impl LocalBot {
    /// Replies are pushed to `inbound`, the same channel a real socket reader feeds.
    #[must_use]
    pub fn new(inbound: mpsc::Sender<Frame>, delay: Duration) -> Self {
        Self {
            inbound,
            delay,
            replies: DEFAULT_REPLIES.iter().map(|r| (*r).to_owned()).collect(),
            pending: Vec::new(),
        }
    }

    /// Replace the canned replies. An empty list keeps the defaults.
    #[must_use]
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        if !replies.is_empty() {
            self.replies = replies;
        }
        self
    }

    /// Replies scheduled but not yet delivered.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    fn pick_reply(&self) -> String {
        self.replies
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default()
    }

    fn schedule_reply(&mut self) {
        self.pending.retain(|h| !h.is_finished());

        let reply = Frame::request(
            syscall::CHAT_MESSAGE,
            serde_json::json!({"id": BOT_ID, "from": BOT_NAME, "text": self.pick_reply()}),
        )
        .with_from(BOT_ID);
        let inbound = self.inbound.clone();
        let delay = self.delay;

        self.pending.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inbound.send(reply).await;
        }));
    }

    fn push(&self, frame: Frame) -> Result<(), TransportError> {
        self.inbound.try_send(frame.with_from(BOT_ID)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    fn answer_lock(&self, locked: bool) -> Result<(), TransportError> {
        self.push(Frame::request(syscall::CHAT_STATUS, serde_json::json!({"locked": locked})))
    }

    fn answer_announce(&self, data: &serde_json::Value) -> Result<(), TransportError> {
        let names: Vec<&str> = data
            .get("winners")
            .and_then(serde_json::Value::as_array)
            .map(|list| list.iter().filter_map(serde_json::Value::as_str).collect())
            .unwrap_or_default();
        if names.is_empty() {
            debug!("bot: announce without winners");
            return Ok(());
        }
        let text = format!("Winners: {}", names.join(", "));
        self.push(Frame::request(syscall::CHAT_ANNOUNCEMENT, serde_json::json!({"text": text})))?;
        self.answer_lock(true)?;
        self.push(Frame::request(syscall::PAYMENT_RESET, serde_json::json!({})))
    }
}

impl Transport for LocalBot {
    fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        if self.inbound.is_closed() {
            return Err(TransportError::Closed);
        }
        match frame.syscall.as_str() {
            syscall::CHAT_MESSAGE => {
                self.schedule_reply();
                Ok(())
            }
            syscall::CHAT_LOCK => self.answer_lock(true),
            syscall::CHAT_UNLOCK => self.answer_lock(false),
            syscall::CHAT_ANNOUNCE => self.answer_announce(&frame.data),
            other => {
                debug!(syscall = %other, "bot: ignoring frame");
                Ok(())
            }
        }
    }
}

impl Drop for LocalBot {
    fn drop(&mut self) {
        for handle in &self.pending {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "bot_test.rs"]
mod tests;
