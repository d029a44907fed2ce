use super::*;
use frames::syscall;

#[test]
fn channel_transport_delivers_in_order() {
    let (mut transport, mut rx) = ChannelTransport::new(4);
    transport.send(Frame::request(syscall::CHAT_MESSAGE, serde_json::json!({"text": "a"}))).unwrap();
    transport.send(Frame::request(syscall::CHAT_MESSAGE, serde_json::json!({"text": "b"}))).unwrap();

    assert_eq!(rx.try_recv().unwrap().data["text"], "a");
    assert_eq!(rx.try_recv().unwrap().data["text"], "b");
}

#[test]
fn channel_transport_reports_full_queue() {
    let (mut transport, _rx) = ChannelTransport::new(1);
    transport.send(Frame::request(syscall::CHAT_LOCK, serde_json::json!({}))).unwrap();
    let err = transport
        .send(Frame::request(syscall::CHAT_LOCK, serde_json::json!({})))
        .unwrap_err();
    assert!(matches!(err, TransportError::Full));
}

#[test]
fn channel_transport_reports_closed_receiver() {
    let (mut transport, rx) = ChannelTransport::new(1);
    drop(rx);
    let err = transport
        .send(Frame::request(syscall::CHAT_LOCK, serde_json::json!({})))
        .unwrap_err();
    assert!(matches!(err, TransportError::Closed));
}
