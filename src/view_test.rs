use super::*;

fn rendered(view: TerminalView<Vec<u8>>) -> String {
    String::from_utf8(view.into_inner()).expect("utf8 output")
}

// =============================================================
// MemoryView
// =============================================================

#[test]
fn memory_view_clear_drops_messages_and_winners() {
    let mut view = MemoryView::default();
    let msg = ChatMessage::new(Sender::Local, None, "hello win", 0);
    view.append_message(&msg);
    view.append_winner(&msg);

    view.clear_messages();
    assert!(view.messages.is_empty());
    assert!(view.winners.is_empty());
}

#[test]
fn memory_view_counts_input_clears() {
    let mut view = MemoryView::default();
    view.clear_input();
    view.clear_input();
    assert_eq!(view.input_clears, 2);
}

// =============================================================
// TerminalView
// =============================================================

#[test]
fn terminal_view_prefixes_by_sender() {
    let mut view = TerminalView::new(Vec::new());
    view.append_message(&ChatMessage::new(Sender::Local, Some("ada".into()), "hi", 0));
    view.append_message(&ChatMessage::new(Sender::Remote, Some("bob".into()), "hey", 1));
    view.append_message(&ChatMessage::new(Sender::Remote, None, "who", 2));
    view.append_message(&ChatMessage::system("Chat is locked", 3));

    assert_eq!(rendered(view), "[you] hi\n[bob] hey\n[anon] who\n* Chat is locked\n");
}

#[test]
fn terminal_view_reports_only_input_changes() {
    let mut view = TerminalView::new(Vec::new());
    view.set_input_enabled(true);
    view.set_input_enabled(true);
    view.set_input_enabled(false);
    view.set_input_enabled(false);
    view.set_input_enabled(true);

    assert_eq!(rendered(view), "-- input disabled --\n-- input enabled --\n");
}

#[test]
fn terminal_view_flushes_collected_winners_when_opened() {
    let mut view = TerminalView::new(Vec::new());
    view.append_winner(&ChatMessage::new(Sender::Local, None, "hello win", 0));
    view.set_winners_visible(true);
    view.append_winner(&ChatMessage::new(Sender::Remote, Some("bob".into()), "win!", 1));
    view.set_winners_visible(false);

    assert_eq!(
        rendered(view),
        "== winners (1) ==\n[winners] [you] hello win\n[winners] [bob] win!\n== winners hidden ==\n"
    );
}
