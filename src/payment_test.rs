use super::*;
use crate::config::WidgetConfig;
use crate::controller::ChatWidgetController;
use crate::inbound::{InboundEvent, parse_frame};
use crate::transport::ChannelTransport;
use crate::view::MemoryView;

fn report(paid_in_session: bool, paid_in_db: bool) -> PaymentReport {
    PaymentReport { username: "ada".to_owned(), paid_in_session, paid_in_db }
}

fn status_of(frame: &Frame) -> Option<InboundEvent> {
    parse_frame(frame)
}

// =============================================================
// report_frame
// =============================================================

#[test]
fn paid_report_replays_success() {
    let frame = report_frame(&report(false, true), false).unwrap();
    assert_eq!(frame.syscall, syscall::PAYMENT_STATUS);
    assert_eq!(status_of(&frame), Some(InboundEvent::Payment(PaymentStatus::Success)));
}

#[test]
fn unpaid_report_requires_payment() {
    let frame = report_frame(&report(false, false), false).unwrap();
    assert_eq!(status_of(&frame), Some(InboundEvent::Payment(PaymentStatus::Required)));
}

#[test]
fn unpaid_admin_gets_no_frame() {
    assert!(report_frame(&report(false, false), true).is_none());
}

#[test]
fn unpaid_session_stays_locked_until_local_payment() {
    let (transport, _rx) = ChannelTransport::new(8);
    let mut c = ChatWidgetController::new(MemoryView::default(), transport, WidgetConfig::default());

    c.handle_frame(&report_frame(&report(false, false), false).unwrap());
    c.handle_frame(&Frame::request(syscall::CHAT_STATUS, serde_json::json!({"locked": false})));
    assert!(c.state().locked);
    assert!(!c.submit_local_message("let me in"));

    c.handle_frame(&payment_status_frame(&PaymentStatus::Success));
    assert!(!c.state().locked);
    assert!(c.submit_local_message("let me in"));
}

// =============================================================
// PayTarget
// =============================================================

#[tokio::test]
async fn local_target_accepts_any_reference() {
    let frame = PayTarget::Local.resolve("anything").await;
    assert_eq!(status_of(&frame), Some(InboundEvent::Payment(PaymentStatus::Success)));
}

#[tokio::test]
async fn server_target_reports_request_errors_as_gateway_error() {
    let api = ApiClient::new("http://127.0.0.1:9", None).unwrap();
    let frame = PayTarget::Server(Arc::new(api)).resolve("../admin").await;

    assert_eq!(frame.syscall, syscall::GATEWAY_ERROR);
    let Some(InboundEvent::Error(message)) = status_of(&frame) else {
        panic!("expected an error event");
    };
    assert!(message.contains("invalid payment reference"), "{message}");
}
