use std::time::Duration;

use frames::syscall;

use super::*;
use crate::bot::{BOT_NAME, LocalBot};
use crate::config::WidgetConfig;
use crate::state::Sender;
use crate::transport::ChannelTransport;
use crate::view::MemoryView;

// =============================================================
// parse_input
// =============================================================

#[test]
fn plain_text_is_submitted_verbatim() {
    assert_eq!(parse_input("hello win"), Input::Event(UiEvent::Submit("hello win".to_owned())));
    assert_eq!(parse_input(""), Input::Event(UiEvent::Submit(String::new())));
}

#[test]
fn slash_commands_map_to_events() {
    assert_eq!(parse_input("/winners"), Input::Event(UiEvent::ToggleWinners));
    assert_eq!(parse_input(" /lock "), Input::Event(UiEvent::RequestLock(true)));
    assert_eq!(parse_input("/unlock"), Input::Event(UiEvent::RequestLock(false)));
    assert_eq!(parse_input("/quit"), Input::Event(UiEvent::Quit));
    assert_eq!(parse_input("/exit"), Input::Event(UiEvent::Quit));
}

#[test]
fn announce_splits_comma_separated_names() {
    assert_eq!(
        parse_input("/announce ada, bob ,,cy"),
        Input::Event(UiEvent::Announce(vec!["ada".to_owned(), "bob".to_owned(), "cy".to_owned()]))
    );
}

#[test]
fn pay_requires_a_reference() {
    assert_eq!(parse_input("/pay ref_123"), Input::Pay("ref_123".to_owned()));
    assert_eq!(parse_input("/pay"), Input::Event(UiEvent::Submit("/pay".to_owned())));
}

#[test]
fn unknown_command_is_plain_text() {
    assert_eq!(parse_input("/dance now"), Input::Event(UiEvent::Submit("/dance now".to_owned())));
}

// =============================================================
// run
// =============================================================

#[tokio::test]
async fn run_applies_events_in_arrival_order_until_quit() {
    let (transport, mut outbound) = ChannelTransport::new(16);
    let mut controller = ChatWidgetController::new(MemoryView::default(), transport, WidgetConfig::default());
    let (ui_tx, ui_rx) = mpsc::channel(16);
    let (inbound_tx, inbound_rx) = mpsc::channel(16);

    inbound_tx
        .send(Frame::request(syscall::SESSION_CONNECTED, serde_json::json!({"client_id": "sid-1"})))
        .await
        .unwrap();
    ui_tx.send(UiEvent::Submit("hello win".to_owned())).await.unwrap();
    ui_tx.send(UiEvent::ToggleWinners).await.unwrap();
    ui_tx.send(UiEvent::Quit).await.unwrap();

    run(&mut controller, ui_rx, inbound_rx).await;

    assert_eq!(controller.state().identity.as_deref(), Some("sid-1"));
    assert!(controller.state().locked);
    assert!(controller.view().winners_visible);
    assert_eq!(controller.view().winners.len(), 1);
    let sent = outbound.try_recv().unwrap();
    assert_eq!(sent.data["id"], "sid-1");
}

#[tokio::test]
async fn run_stops_when_input_closes() {
    let (transport, _outbound) = ChannelTransport::new(4);
    let mut controller = ChatWidgetController::new(MemoryView::default(), transport, WidgetConfig::default());
    let (ui_tx, ui_rx) = mpsc::channel::<UiEvent>(4);
    let (_inbound_tx, inbound_rx) = mpsc::channel(4);
    drop(ui_tx);

    run(&mut controller, ui_rx, inbound_rx).await;
    assert!(controller.view().messages.is_empty());
}

#[tokio::test]
async fn run_stops_when_transport_closes() {
    let (transport, _outbound) = ChannelTransport::new(4);
    let mut controller = ChatWidgetController::new(MemoryView::default(), transport, WidgetConfig::default());
    let (_ui_tx, ui_rx) = mpsc::channel::<UiEvent>(4);
    let (inbound_tx, inbound_rx) = mpsc::channel(4);
    inbound_tx
        .send(Frame::request(syscall::CHAT_STATUS, serde_json::json!({"locked": true})))
        .await
        .unwrap();
    drop(inbound_tx);

    run(&mut controller, ui_rx, inbound_rx).await;
    assert!(controller.state().locked);
}

#[tokio::test(start_paused = true)]
async fn local_bot_session_shows_reply() {
    let (inbound_tx, inbound_rx) = mpsc::channel(16);
    let bot = LocalBot::new(inbound_tx, Duration::from_millis(1000)).with_replies(vec!["I win too".to_owned()]);
    let mut controller = ChatWidgetController::new(MemoryView::default(), bot, WidgetConfig::default());
    let (ui_tx, ui_rx) = mpsc::channel(16);

    ui_tx.send(UiEvent::Submit("hello".to_owned())).await.unwrap();
    let quit = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        ui_tx.send(UiEvent::Quit).await.unwrap();
    });

    run(&mut controller, ui_rx, inbound_rx).await;
    quit.await.unwrap();

    let messages = &controller.view().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::Local);
    assert_eq!(messages[1].sender, Sender::Remote);
    assert_eq!(messages[1].author.as_deref(), Some(BOT_NAME));
    assert_eq!(controller.view().winners.len(), 1);
}
