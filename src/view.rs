//! Rendering surface for the chat widget.
//!
//! DESIGN
//! ======
//! `ChatView` is the seam between the controller and whatever draws the
//! widget. The controller pushes every visible change through it and never
//! reads state back, so a view can be a terminal, a test recorder, or a
//! browser binding without the controller noticing.

use std::io::Write;

use crate::state::{ChatMessage, Sender};

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;

pub trait ChatView {
    /// Append a line to the transcript.
    fn append_message(&mut self, message: &ChatMessage);

    /// Drop the transcript and the winners list.
    fn clear_messages(&mut self);

    /// Empty the text input after a successful send.
    fn clear_input(&mut self);

    /// Enable or disable the text input and send button together.
    fn set_input_enabled(&mut self, enabled: bool);

    /// Append a line to the winners panel.
    fn append_winner(&mut self, message: &ChatMessage);

    fn set_winners_visible(&mut self, visible: bool);
}

// =============================================================================
// MEMORY VIEW
// =============================================================================

/// Records everything pushed to it. Used by tests and headless embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryView {
    pub messages: Vec<ChatMessage>,
    pub winners: Vec<ChatMessage>,
    pub input_enabled: bool,
    pub winners_visible: bool,
    pub input_clears: usize,
}

impl ChatView for MemoryView {
    fn append_message(&mut self, message: &ChatMessage) {
        self.messages.push(message.clone());
    }

    fn clear_messages(&mut self) {
        self.messages.clear();
        self.winners.clear();
    }

    fn clear_input(&mut self) {
        self.input_clears += 1;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn append_winner(&mut self, message: &ChatMessage) {
        self.winners.push(message.clone());
    }

    fn set_winners_visible(&mut self, visible: bool) {
        self.winners_visible = visible;
    }
}

// =============================================================================
// TERMINAL VIEW
// =============================================================================

/// Line-oriented renderer for the terminal front end.
///
/// Winners are collected while the panel is hidden and printed as a block
/// when it opens. Write failures are dropped; stdout going away ends the
/// session through the input side anyway.
pub struct TerminalView<W: Write> {
    out: W,
    winners: Vec<String>,
    winners_visible: bool,
    input_enabled: Option<bool>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, winners: Vec::new(), winners_visible: false, input_enabled: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn render_line(message: &ChatMessage) -> String {
    match message.sender {
        Sender::Local => format!("[you] {}", message.text),
        Sender::Remote => format!("[{}] {}", message.author.as_deref().unwrap_or("anon"), message.text),
        Sender::System => format!("* {}", message.text),
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_message(&mut self, message: &ChatMessage) {
        let _ = writeln!(self.out, "{}", render_line(message));
    }

    fn clear_messages(&mut self) {
        self.winners.clear();
        let _ = writeln!(self.out, "----");
    }

    fn clear_input(&mut self) {}

    fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled == Some(enabled) {
            return;
        }
        // The first call only records the initial state.
        if self.input_enabled.is_some() {
            let label = if enabled { "input enabled" } else { "input disabled" };
            let _ = writeln!(self.out, "-- {label} --");
        }
        self.input_enabled = Some(enabled);
    }

    fn append_winner(&mut self, message: &ChatMessage) {
        let line = render_line(message);
        if self.winners_visible {
            let _ = writeln!(self.out, "[winners] {line}");
        }
        self.winners.push(line);
    }

    fn set_winners_visible(&mut self, visible: bool) {
        if self.winners_visible == visible {
            return;
        }
        self.winners_visible = visible;
        if visible {
            let _ = writeln!(self.out, "== winners ({}) ==", self.winners.len());
            for line in &self.winners {
                let _ = writeln!(self.out, "[winners] {line}");
            }
        } else {
            let _ = writeln!(self.out, "== winners hidden ==");
        }
    }
}
