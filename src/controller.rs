//! Chat widget controller.
//!
//! DESIGN
//! ======
//! The controller owns the view handle, the session flags and the outbound
//! transport. Every UI action and every inbound event is a synchronous method
//! call; the adapter decides when to call them. Preconditions that fail
//! (locked chat, empty text, non-admin request) are silent no-ops reported
//! through the boolean return and a log line, never errors.
//!
//! INVARIANTS
//! ==========
//! - The view's input is enabled iff `state.locked` is false.
//! - While a payment is required and not confirmed, the server cannot unlock.
//! - Messages get their `seq` in the order they are appended.
//! - Transport failures are logged and otherwise ignored.

use frames::{Frame, syscall};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::{EchoKey, WidgetConfig};
use crate::inbound::{self, InboundEvent, PaymentStatus, RemoteMessage};
use crate::state::{ChatMessage, ChatState, Sender};
use crate::transport::Transport;
use crate::view::ChatView;

pub const LOCKED_NOTICE: &str = "Chat is locked.";
pub const UNLOCKED_NOTICE: &str = "Chat is unlocked.";
pub const PAYMENT_REQUIRED_NOTICE: &str = "Payment required to chat.";

pub struct ChatWidgetController<V, T> {
    view: V,
    transport: T,
    state: ChatState,
    config: WidgetConfig,
}

impl<V: ChatView, T: Transport> ChatWidgetController<V, T> {
    pub fn new(mut view: V, transport: T, config: WidgetConfig) -> Self {
        let state = ChatState::default();
        view.set_input_enabled(state.input_enabled());
        view.set_winners_visible(state.winners_visible);
        Self { view, transport, state, config }
    }

    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    // =========================================================================
    // LOCAL ACTIONS
    // =========================================================================

    /// Append and forward a line typed by the local user.
    ///
    /// Returns `false` without touching the view when the chat is locked or
    /// the text is blank.
    pub fn submit_local_message(&mut self, text: &str) -> bool {
        if self.state.locked {
            debug!("chat: submit ignored while locked");
            return false;
        }
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let seq = self.state.next_seq();
        let message = ChatMessage::new(Sender::Local, self.config.username.clone(), text, seq);
        self.append(&message);
        self.view.clear_input();
        self.state.has_sent = true;

        let mut data = Map::new();
        if let Some(identity) = &self.state.identity {
            data.insert("id".into(), Value::String(identity.clone()));
        }
        if let Some(username) = &self.config.username {
            data.insert("from".into(), Value::String(username.clone()));
        }
        data.insert("text".into(), Value::String(text.to_owned()));
        self.send(Frame::request(syscall::CHAT_MESSAGE, Value::Object(data)));
        true
    }

    /// Show or hide the winners panel. Locks the chat as a side effect.
    ///
    /// No-op until the local user has sent at least one message.
    pub fn toggle_winners_panel(&mut self) -> bool {
        if !self.state.has_sent {
            debug!("chat: winners panel unavailable before first send");
            return false;
        }
        self.state.winners_visible = !self.state.winners_visible;
        self.view.set_winners_visible(self.state.winners_visible);
        self.set_locked(true);
        true
    }

    /// Ask the server to lock or unlock the room. Admin only.
    ///
    /// The local lock flag changes when the resulting `chat:status` arrives.
    pub fn request_lock(&mut self, locked: bool) -> bool {
        if !self.config.is_admin {
            warn!(locked, "chat: lock request requires admin");
            return false;
        }
        let name = if locked { syscall::CHAT_LOCK } else { syscall::CHAT_UNLOCK };
        self.send(Frame::request(name, Value::Object(Map::new())));
        true
    }

    /// Ask the server to announce winners. Admin only; blank names are dropped.
    pub fn announce_winners(&mut self, names: &[String]) -> bool {
        if !self.config.is_admin {
            warn!("chat: announce requires admin");
            return false;
        }
        let names: Vec<Value> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| Value::String(n.to_owned()))
            .collect();
        if names.is_empty() {
            return false;
        }
        self.send(Frame::request(syscall::CHAT_ANNOUNCE, serde_json::json!({ "winners": names })));
        true
    }

    // =========================================================================
    // STATE CHANGES
    // =========================================================================

    /// Set the lock flag, sync the input affordance and post a notice.
    pub fn set_locked(&mut self, locked: bool) {
        self.state.locked = locked;
        self.view.set_input_enabled(self.state.input_enabled());
        info!(locked, "chat: lock state changed");
        self.push_system(if locked { LOCKED_NOTICE } else { UNLOCKED_NOTICE });
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        let identity = identity.into();
        info!(%identity, "chat: session identity assigned");
        self.state.identity = Some(identity);
    }

    pub fn apply_payment_status(&mut self, status: &PaymentStatus) {
        info!(status = status.as_str(), "chat: payment status");
        match status {
            PaymentStatus::Success => {
                self.state.paid = true;
                self.push_system("Payment confirmed.");
                self.set_locked(false);
            }
            PaymentStatus::Failed => {
                self.push_system("Payment failed.");
                if !self.state.paid {
                    self.state.payment_required = true;
                    self.set_locked(true);
                }
            }
            PaymentStatus::Pending => self.push_system("Payment pending."),
            PaymentStatus::Required => {
                if !self.state.paid {
                    self.state.payment_required = true;
                    self.push_system(PAYMENT_REQUIRED_NOTICE);
                    self.set_locked(true);
                }
            }
            PaymentStatus::Unknown(raw) => self.push_system(&format!("Payment status: {raw}.")),
        }
    }

    /// Revoke the paid flag and lock until payment is confirmed again.
    pub fn reset_payment(&mut self, notice: &str) {
        self.state.paid = false;
        self.state.payment_required = true;
        self.push_system(notice);
        self.set_locked(true);
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Append a line from the transport unless it is this widget's own echo.
    pub fn receive_remote_message(&mut self, message: RemoteMessage) -> bool {
        if self.is_own_echo(&message) {
            debug!("chat: suppressed own echo");
            return false;
        }
        let text = message.text.trim();
        if text.is_empty() {
            return false;
        }
        let seq = self.state.next_seq();
        let line = ChatMessage::new(Sender::Remote, message.author.clone(), text, seq);
        self.append(&line);
        true
    }

    /// Replace the transcript with replayed history, oldest first.
    pub fn load_history(&mut self, rows: Vec<RemoteMessage>) {
        self.view.clear_messages();
        for row in rows {
            let text = row.text.trim();
            if text.is_empty() {
                continue;
            }
            let sender = if self.is_own_echo(&row) { Sender::Local } else { Sender::Remote };
            let seq = self.state.next_seq();
            let line = ChatMessage::new(sender, row.author.clone(), text, seq);
            self.append(&line);
        }
    }

    pub fn show_announcement(&mut self, text: &str) {
        self.push_system(text);
    }

    pub fn show_error(&mut self, message: &str) {
        warn!(%message, "chat: server error");
        self.push_system(&format!("error: {message}"));
    }

    /// Parse and apply one inbound frame.
    pub fn handle_frame(&mut self, frame: &Frame) {
        match inbound::parse_frame(frame) {
            Some(event) => self.apply(event),
            None => debug!(syscall = %frame.syscall, status = ?frame.status, "chat: ignored frame"),
        }
    }

    pub fn apply(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Connected { client_id, username } => {
                self.set_identity(client_id);
                if self.config.username.is_none() {
                    self.config.username = username;
                }
            }
            InboundEvent::Message(message) => {
                self.receive_remote_message(message);
            }
            InboundEvent::History(rows) => self.load_history(rows),
            InboundEvent::Status { locked } => self.apply_server_lock(locked),
            InboundEvent::Payment(status) => self.apply_payment_status(&status),
            InboundEvent::Announcement(text) => self.show_announcement(&text),
            InboundEvent::PaymentReset => self.reset_payment("Payment reset. Pay again to keep chatting."),
            InboundEvent::SessionReset { message, session_code } => {
                info!(session_code = session_code.as_deref().unwrap_or("-"), "chat: session reset");
                self.reset_payment(&message);
            }
            InboundEvent::Error(message) => self.show_error(&message),
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn apply_server_lock(&mut self, locked: bool) {
        if !locked && self.state.payment_required && !self.state.paid {
            info!("chat: unlock held until payment is confirmed");
            if !self.state.locked {
                self.set_locked(true);
            }
            return;
        }
        self.set_locked(locked);
    }

    fn is_own_echo(&self, message: &RemoteMessage) -> bool {
        let (mine, theirs) = match self.config.echo_key {
            EchoKey::ClientId => (self.state.identity.as_deref(), message.origin.as_deref()),
            EchoKey::Username => (self.config.username.as_deref(), message.author.as_deref()),
        };
        matches!((mine, theirs), (Some(a), Some(b)) if a == b)
    }

    fn append(&mut self, message: &ChatMessage) {
        self.view.append_message(message);
        if message.sender != Sender::System && message.mentions(&self.config.winner_keyword) {
            self.view.append_winner(message);
        }
    }

    fn push_system(&mut self, text: &str) {
        let seq = self.state.next_seq();
        self.view.append_message(&ChatMessage::system(text, seq));
    }

    fn send(&mut self, frame: Frame) {
        let syscall = frame.syscall.clone();
        if let Err(error) = self.transport.send(frame) {
            warn!(%syscall, %error, "chat: transport send failed");
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
