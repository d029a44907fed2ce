//! Payment results as inbound frames.
//!
//! Verification runs off the controller, on HTTP or locally, and its outcome
//! is fed back through the inbound channel as a `payment:status` frame so it
//! is applied in arrival order with everything else.

use std::sync::Arc;

use frames::{Frame, syscall};
use tracing::{info, warn};

use crate::api::{ApiClient, PaymentReport};
use crate::inbound::PaymentStatus;

#[must_use]
pub fn payment_status_frame(status: &PaymentStatus) -> Frame {
    Frame::request(syscall::PAYMENT_STATUS, serde_json::json!({ "status": status.as_str() }))
}

/// Frame that brings a fresh widget in line with the server's payment record.
///
/// Paid sessions replay as `success`. Unpaid sessions are `required` unless
/// the user is an admin, who never pays.
#[must_use]
pub fn report_frame(report: &PaymentReport, is_admin: bool) -> Option<Frame> {
    if report.paid() {
        return Some(payment_status_frame(&PaymentStatus::Success));
    }
    if is_admin {
        return None;
    }
    Some(payment_status_frame(&PaymentStatus::Required))
}

/// Where `/pay` sends its reference.
#[derive(Clone)]
pub enum PayTarget {
    /// Accept every reference.
    Local,
    Server(Arc<ApiClient>),
}

impl PayTarget {
    /// Verify `reference` and wrap the outcome for the inbound channel.
    ///
    /// Request failures come back as a `gateway:error` frame.
    pub async fn resolve(&self, reference: &str) -> Frame {
        match self {
            Self::Local => {
                info!(%reference, "payment: local reference accepted");
                payment_status_frame(&PaymentStatus::Success)
            }
            Self::Server(api) => match api.verify_payment(reference).await {
                Ok(status) => payment_status_frame(&status),
                Err(error) => {
                    warn!(%reference, %error, "payment: verification failed");
                    Frame::request(syscall::GATEWAY_ERROR, serde_json::json!({ "message": error.to_string() }))
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "payment_test.rs"]
mod tests;
