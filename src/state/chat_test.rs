use super::*;

// =============================================================
// ChatState defaults
// =============================================================

#[test]
fn chat_state_default_is_unlocked_and_unsent() {
    let state = ChatState::default();
    assert!(!state.locked);
    assert!(!state.has_sent);
    assert!(!state.paid);
    assert!(!state.winners_visible);
    assert_eq!(state.identity, None);
    assert!(state.input_enabled());
}

#[test]
fn input_enabled_tracks_lock() {
    let state = ChatState { locked: true, ..ChatState::default() };
    assert!(!state.input_enabled());
}

#[test]
fn next_seq_counts_up_from_zero() {
    let mut state = ChatState::default();
    assert_eq!(state.next_seq(), 0);
    assert_eq!(state.next_seq(), 1);
    assert_eq!(state.next_seq(), 2);
}

// =============================================================
// ChatMessage
// =============================================================

#[test]
fn mentions_is_case_insensitive() {
    let msg = ChatMessage::new(Sender::Local, None, "I think I WIN today", 0);
    assert!(msg.mentions("win"));
    assert!(msg.mentions("Win"));
}

#[test]
fn mentions_matches_inside_words() {
    let msg = ChatMessage::new(Sender::Remote, Some("ada".into()), "winner winner", 3);
    assert!(msg.mentions("win"));
}

#[test]
fn mentions_rejects_empty_keyword() {
    let msg = ChatMessage::new(Sender::Local, None, "hello win", 0);
    assert!(!msg.mentions(""));
    assert!(!msg.mentions("   "));
}

#[test]
fn system_message_has_no_author() {
    let msg = ChatMessage::system("Chat is locked", 7);
    assert_eq!(msg.sender, Sender::System);
    assert_eq!(msg.author, None);
    assert_eq!(msg.seq, 7);
}
