//! Websocket transport.
//!
//! LIFECYCLE
//! =========
//! 1. `connect` upgrades with the session cookie attached
//! 2. a writer task drains the `ChannelTransport` queue, one binary frame each
//! 3. a reader task decodes binary frames into the caller's inbound channel
//! 4. when the socket ends the reader pushes a `gateway:error` notice so the
//!    adapter can surface the disconnect; dropping `SocketTasks` stops both
//!
//! Reconnection is left to the caller.

use frames::{Frame, syscall};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{COOKIE, HeaderValue};
use tracing::{debug, info, warn};

use super::{ChannelTransport, FRAME_CHANNEL_CAPACITY, TransportError};

/// Path of the realtime endpoint on the chat server.
pub const WS_PATH: &str = "/ws";

/// Handles to the socket tasks. Dropping aborts both.
pub struct SocketTasks {
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Drop for SocketTasks {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Derive the websocket URL from the HTTP base URL.
pub fn ws_url(base_url: &str) -> Result<String, TransportError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{WS_PATH}"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{WS_PATH}"));
    }

    Err(TransportError::InvalidUrl(base_url.to_owned()))
}

/// Open the socket and spawn its reader and writer tasks.
///
/// Inbound frames are pushed to `inbound` in arrival order.
pub async fn connect(
    url: &str,
    session_token: Option<&str>,
    inbound: mpsc::Sender<Frame>,
) -> Result<(ChannelTransport, SocketTasks), TransportError> {
    let mut request = url
        .into_client_request()
        .map_err(|error| TransportError::Connect(Box::new(error)))?;
    if let Some(token) = session_token {
        request
            .headers_mut()
            .insert(COOKIE, HeaderValue::from_str(&format!("session={token}"))?);
    }

    let (socket, _) = connect_async(request)
        .await
        .map_err(|error| TransportError::Connect(Box::new(error)))?;
    info!(%url, "ws: connected");

    let (mut sink, mut stream) = socket.split();
    let (transport, mut outbound) = ChannelTransport::new(FRAME_CHANNEL_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            debug!(id = %frame.id, syscall = %frame.syscall, "ws: send frame");
            let bytes = frames::encode_frame(&frame);
            if let Err(error) = sink.send(Message::Binary(bytes.into())).await {
                warn!(%error, "ws: send failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Binary(bytes)) => match frames::decode_frame(&bytes) {
                    Ok(frame) => {
                        if inbound.send(frame).await.is_err() {
                            return;
                        }
                    }
                    Err(error) => warn!(%error, "ws: dropping undecodable frame"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(error) => {
                    warn!(%error, "ws: read failed");
                    break;
                }
            }
        }
        info!("ws: connection closed");
        let notice = Frame::request(syscall::GATEWAY_ERROR, serde_json::json!({"message": "connection closed"}));
        let _ = inbound.send(notice).await;
    });

    Ok((transport, SocketTasks { reader, writer }))
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
