use super::*;

fn chat(text: &str) -> Frame {
    Frame::request(syscall::CHAT_MESSAGE, serde_json::json!({"id": "me", "text": text}))
}

#[tokio::test(start_paused = true)]
async fn reply_arrives_after_delay() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(1000)).with_replies(vec!["pong".to_owned()]);

    bot.send(chat("ping")).unwrap();
    assert_eq!(bot.pending(), 1);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(2)).await;
    let reply = rx.recv().await.unwrap();
    assert_eq!(reply.syscall, syscall::CHAT_MESSAGE);
    assert_eq!(reply.from.as_deref(), Some(BOT_ID));
    assert_eq!(reply.data["text"], "pong");
    assert_eq!(reply.data["from"], BOT_NAME);
}

#[tokio::test(start_paused = true)]
async fn one_reply_per_message() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));

    bot.send(chat("a")).unwrap();
    bot.send(chat("b")).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(rx.recv().await.is_some());
    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_bot_cancels_pending_replies() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(500));
    bot.send(chat("hello")).unwrap();
    drop(bot);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    // All senders are gone and nothing was delivered.
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn lock_requests_answer_with_status() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));

    bot.send(Frame::request(syscall::CHAT_LOCK, serde_json::json!({}))).unwrap();
    bot.send(Frame::request(syscall::CHAT_UNLOCK, serde_json::json!({}))).unwrap();

    let first = rx.try_recv().unwrap();
    assert_eq!(first.syscall, syscall::CHAT_STATUS);
    assert_eq!(first.data["locked"], true);
    assert_eq!(rx.try_recv().unwrap().data["locked"], false);
    assert_eq!(bot.pending(), 0);
}

#[tokio::test]
async fn send_fails_once_inbound_is_gone() {
    let (tx, rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));
    drop(rx);
    assert!(matches!(bot.send(chat("x")), Err(TransportError::Closed)));
}

#[tokio::test]
async fn unrelated_frames_are_ignored() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));
    bot.send(Frame::request(syscall::SESSION_RESET, serde_json::json!({}))).unwrap();
    bot.send(Frame::request(syscall::CHAT_ANNOUNCE, serde_json::json!({"winners": []}))).unwrap();
    assert_eq!(bot.pending(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn announce_posts_winners_then_locks_and_resets_payment() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));
    bot.send(Frame::request(syscall::CHAT_ANNOUNCE, serde_json::json!({"winners": ["ada", "bob"]}))).unwrap();

    let announcement = rx.try_recv().unwrap();
    assert_eq!(announcement.syscall, syscall::CHAT_ANNOUNCEMENT);
    assert_eq!(announcement.data["text"], "Winners: ada, bob");

    let status = rx.try_recv().unwrap();
    assert_eq!(status.syscall, syscall::CHAT_STATUS);
    assert_eq!(status.data["locked"], true);

    assert_eq!(rx.try_recv().unwrap().syscall, syscall::PAYMENT_RESET);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn full_inbound_reports_full() {
    let (tx, _rx) = mpsc::channel(1);
    let mut bot = LocalBot::new(tx, Duration::from_millis(10));
    bot.send(Frame::request(syscall::CHAT_LOCK, serde_json::json!({}))).unwrap();
    assert!(matches!(
        bot.send(Frame::request(syscall::CHAT_UNLOCK, serde_json::json!({}))),
        Err(TransportError::Full)
    ));
}
