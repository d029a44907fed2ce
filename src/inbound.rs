//! Inbound frame parsing.
//!
//! Turns raw transport frames into typed events the controller applies.
//! Payload fields are read leniently: the server has shipped several
//! spellings (`text`/`message`, `from`/`username`) and history rows use
//! their own column names, so each field tries a list of keys in order.

use frames::{Frame, Status, syscall};
use serde_json::Value;

/// A chat line received from the transport, before echo suppression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteMessage {
    /// Connection identifier of the sender, when known.
    pub origin: Option<String>,
    /// Display name of the sender, when known.
    pub author: Option<String>,
    pub text: String,
    /// Milliseconds since the Unix epoch, when the payload carried a number.
    pub timestamp: Option<i64>,
}

/// Result of a payment verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
    /// No payment on record and one is needed to chat.
    Required,
    Unknown(String),
}

impl PaymentStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            "required" => Self::Required,
            other => Self::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Required => "required",
            Self::Unknown(raw) => raw,
        }
    }
}

/// Everything the controller reacts to from the transport side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    Connected { client_id: String, username: Option<String> },
    Message(RemoteMessage),
    History(Vec<RemoteMessage>),
    Status { locked: bool },
    Payment(PaymentStatus),
    Announcement(String),
    PaymentReset,
    SessionReset { message: String, session_code: Option<String> },
    Error(String),
}

const SESSION_RESET_NOTICE: &str = "Chat session reset. Payment required to continue chatting.";

/// Parse one frame. Returns `None` for frames the widget has no use for.
#[must_use]
pub fn parse_frame(frame: &Frame) -> Option<InboundEvent> {
    match frame.status {
        Status::Cancel => return None,
        Status::Error => {
            let message = frame_error_message(frame)
                .map_or_else(|| format!("{} failed", frame.syscall), ToOwned::to_owned);
            return Some(InboundEvent::Error(message));
        }
        Status::Request | Status::Item | Status::Done => {}
    }

    match frame.syscall.as_str() {
        syscall::SESSION_CONNECTED => {
            let client_id = pick_str(&frame.data, &["client_id", "sid"])?.to_owned();
            let username = pick_str(&frame.data, &["username", "user_name"]).map(ToOwned::to_owned);
            Some(InboundEvent::Connected { client_id, username })
        }
        syscall::CHAT_MESSAGE => parse_remote_message(frame, &frame.data).map(InboundEvent::Message),
        syscall::CHAT_HISTORY => {
            let rows = frame.data.get("messages")?.as_array()?;
            let list = rows
                .iter()
                .filter_map(|row| parse_remote_message(frame, row))
                .collect();
            Some(InboundEvent::History(list))
        }
        syscall::CHAT_STATUS => {
            let locked = frame.data.get("locked")?.as_bool()?;
            Some(InboundEvent::Status { locked })
        }
        syscall::PAYMENT_STATUS => {
            let raw = pick_str(&frame.data, &["status"])?;
            Some(InboundEvent::Payment(PaymentStatus::parse(raw)))
        }
        syscall::CHAT_ANNOUNCEMENT => {
            let text = pick_str(&frame.data, &["text", "message"])?.trim();
            if text.is_empty() {
                return None;
            }
            Some(InboundEvent::Announcement(text.to_owned()))
        }
        syscall::PAYMENT_RESET => Some(InboundEvent::PaymentReset),
        syscall::SESSION_RESET => Some(InboundEvent::SessionReset {
            message: pick_str(&frame.data, &["message"])
                .unwrap_or(SESSION_RESET_NOTICE)
                .to_owned(),
            session_code: pick_str(&frame.data, &["session_code"])
                .map(ToOwned::to_owned)
                .or_else(|| frame.session.clone()),
        }),
        syscall::GATEWAY_ERROR => {
            let message = frame_error_message(frame).unwrap_or("gateway error");
            Some(InboundEvent::Error(message.to_owned()))
        }
        _ => None,
    }
}

/// Parse a chat line from `data`, falling back to frame metadata.
/// Rows without text are rejected.
fn parse_remote_message(frame: &Frame, data: &Value) -> Option<RemoteMessage> {
    let text = pick_str(data, &["text", "message", "content"])?.to_owned();

    let origin = pick_str(data, &["id", "client_id", "user_id"])
        .or(frame.from.as_deref())
        .map(ToOwned::to_owned);

    let author = pick_str(data, &["from", "username", "from_user", "user_name"]).map(ToOwned::to_owned);

    let timestamp = pick_i64(data, &["timestamp", "ts"]);

    Some(RemoteMessage { origin, author, text, timestamp })
}

fn frame_error_message(frame: &Frame) -> Option<&str> {
    pick_str(&frame.data, &["message", "msg", "error"])
}

fn pick_str<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| data.get(key).and_then(Value::as_str))
}

#[allow(clippy::cast_possible_truncation)]
fn pick_i64(data: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| {
        let value = data.get(key)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        })
    })
}

#[cfg(test)]
#[path = "inbound_test.rs"]
mod tests;
