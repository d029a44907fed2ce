#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

/// Who produced a chat line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    /// Typed into this widget.
    Local,
    /// Received from the transport.
    Remote,
    /// Notice generated by the widget itself (lock changes, payment, errors).
    System,
}

/// A single chat line. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    /// Display name of the author, when the payload carried one.
    pub author: Option<String>,
    pub text: String,
    /// Arrival order within this session.
    pub seq: u64,
}

impl ChatMessage {
    #[must_use]
    pub fn new(sender: Sender, author: Option<String>, text: impl Into<String>, seq: u64) -> Self {
        Self { sender, author, text: text.into(), seq }
    }

    #[must_use]
    pub fn system(text: impl Into<String>, seq: u64) -> Self {
        Self::new(Sender::System, None, text, seq)
    }

    /// Case-insensitive substring match. An empty keyword matches nothing.
    #[must_use]
    pub fn mentions(&self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }
        self.text.to_lowercase().contains(&keyword.to_lowercase())
    }
}

/// Session-scoped widget flags.
#[derive(Clone, Debug, Default)]
pub struct ChatState {
    /// Input and send are disabled while set.
    pub locked: bool,
    /// At least one local message was accepted this session.
    pub has_sent: bool,
    /// Payment confirmed for this session.
    pub paid: bool,
    /// The server expects a payment; while unpaid, unlocks are refused.
    pub payment_required: bool,
    pub winners_visible: bool,
    /// Identity the server assigned to this connection.
    pub identity: Option<String>,
    next_seq: u64,
}

impl ChatState {
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        !self.locked
    }

    /// Hand out the next arrival sequence number.
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        seq
    }
}
