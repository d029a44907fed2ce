//! HTTP helpers for the chat server's payment endpoints.
//!
//! The websocket carries chat traffic; payment verification and the paid
//! check are plain JSON routes authenticated by the `session` cookie.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Server` with the body's message when
//! it has one. A declined payment is not an error: `/verify` reports it as
//! `status: failed`, with a 200 or a 4xx, and either maps to
//! `PaymentStatus::Failed`. A 2xx body that is not the expected JSON is
//! `ApiError::Decode`.

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::inbound::PaymentStatus;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid payment reference: {0:?}")]
    InvalidReference(String),
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
}

/// Body of `GET /check_payment_status`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PaymentReport {
    pub username: String,
    #[serde(default)]
    pub paid_in_session: bool,
    #[serde(default)]
    pub paid_in_db: bool,
}

impl PaymentReport {
    #[must_use]
    pub fn paid(&self) -> bool {
        self.paid_in_session || self.paid_in_db
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, session_token: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = session_token {
            headers.insert(COOKIE, HeaderValue::from_str(&format!("session={token}"))?);
        }
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check that the server answers at all.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.http.get(self.endpoint("/")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Server { status: status.as_u16(), message: "health check failed".to_owned() });
        }
        Ok(())
    }

    /// Ask the server to verify a payment reference with the processor.
    pub async fn verify_payment(&self, reference: &str) -> Result<PaymentStatus, ApiError> {
        let path = verify_path(reference)?;
        let (status, body) = self.get(&path).await?;
        let payment = verify_reply(status, &body)?;
        info!(%reference, http_status = status, status = payment.as_str(), "api: payment verified");
        Ok(payment)
    }

    pub async fn payment_report(&self) -> Result<PaymentReport, ApiError> {
        let (status, body) = self.get("/check_payment_status").await?;
        let value = decode_reply(status, &body)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get(&self, path: &str) -> Result<(u16, String), ApiError> {
        let response = self.http.get(self.endpoint(path)).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decode a JSON reply body. Non-2xx replies become `ApiError::Server`.
fn decode_reply(status: u16, body: &str) -> Result<Value, ApiError> {
    if is_success(status) {
        return Ok(serde_json::from_str(body)?);
    }
    let value = serde_json::from_str::<Value>(body).unwrap_or_else(|_| match body.trim() {
        "" => Value::Null,
        text => Value::String(text.to_owned()),
    });
    Err(ApiError::Server { status, message: error_message(&value) })
}

/// Read the payment status out of a `/verify` reply.
///
/// Declines arrive as 401/404 with a `status` body; those are results.
fn verify_reply(status: u16, body: &str) -> Result<PaymentStatus, ApiError> {
    if !is_success(status) {
        let declined = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("status").and_then(Value::as_str).map(PaymentStatus::parse));
        if let Some(payment) = declined {
            return Ok(payment);
        }
    }
    let value = decode_reply(status, body)?;
    let raw = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or(ApiError::MissingField("status"))?;
    Ok(PaymentStatus::parse(raw))
}

/// Build the verify path, rejecting references that would escape the segment.
fn verify_path(reference: &str) -> Result<String, ApiError> {
    let reference = reference.trim();
    let valid = !reference.is_empty()
        && reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(ApiError::InvalidReference(reference.to_owned()));
    }
    Ok(format!("/verify/{reference}"))
}

fn error_message(body: &Value) -> String {
    ["message", "error", "msg"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .or_else(|| body.as_str())
        .map_or_else(
            || match body {
                Value::Null => "no response body".to_owned(),
                other => other.to_string(),
            },
            ToOwned::to_owned,
        )
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
