//! Event adapter between input sources and the controller.
//!
//! DESIGN
//! ======
//! `run` is the only place that waits. It `select!`s over UI events and
//! inbound frames and applies each one to the controller as it arrives, so
//! the controller itself stays synchronous and testable without a runtime.
//! Inbound frames are polled first: a lock that is already queued must land
//! before a queued submit is considered.
//!
//! Either channel closing ends the loop: no more input means the user left,
//! no more frames means every transport sender is gone.

use frames::Frame;
use tokio::sync::mpsc;
use tracing::info;

use crate::controller::ChatWidgetController;
use crate::transport::Transport;
use crate::view::ChatView;

/// A user action aimed at the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Submit(String),
    ToggleWinners,
    RequestLock(bool),
    Announce(Vec<String>),
    Quit,
}

/// One parsed line of terminal input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Event(UiEvent),
    /// Verify a payment reference. Handled outside the controller.
    Pay(String),
}

/// Parse a terminal line. Unknown slash commands are sent as plain text.
#[must_use]
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let (command, rest) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(c, r)| (c, r.trim()));

    let event = match command {
        "/winners" => UiEvent::ToggleWinners,
        "/lock" => UiEvent::RequestLock(true),
        "/unlock" => UiEvent::RequestLock(false),
        "/quit" | "/exit" => UiEvent::Quit,
        "/announce" => UiEvent::Announce(
            rest.split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
        ),
        "/pay" if !rest.is_empty() => return Input::Pay(rest.to_owned()),
        _ => UiEvent::Submit(line.to_owned()),
    };
    Input::Event(event)
}

/// Apply one UI event. Returns `false` when the session should end.
pub fn apply_ui<V: ChatView, T: Transport>(controller: &mut ChatWidgetController<V, T>, event: UiEvent) -> bool {
    match event {
        UiEvent::Submit(text) => {
            controller.submit_local_message(&text);
        }
        UiEvent::ToggleWinners => {
            controller.toggle_winners_panel();
        }
        UiEvent::RequestLock(locked) => {
            controller.request_lock(locked);
        }
        UiEvent::Announce(names) => {
            controller.announce_winners(&names);
        }
        UiEvent::Quit => return false,
    }
    true
}

/// Drive the controller until the user quits or a channel closes.
pub async fn run<V: ChatView, T: Transport>(
    controller: &mut ChatWidgetController<V, T>,
    mut ui: mpsc::Receiver<UiEvent>,
    mut inbound: mpsc::Receiver<Frame>,
) {
    loop {
        tokio::select! {
            biased;

            frame = inbound.recv() => {
                let Some(frame) = frame else {
                    info!("adapter: transport closed");
                    break;
                };
                controller.handle_frame(&frame);
            }
            event = ui.recv() => {
                let Some(event) = event else {
                    info!("adapter: input closed");
                    break;
                };
                if !apply_ui(controller, event) {
                    info!("adapter: quit requested");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
