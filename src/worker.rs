use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{
    connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream,
};

use crate::config::Config;

/// The fixed payload sent once on every connection.
pub const MESSAGE: &str = "fred";

/// How long the single send may block before it fails with a timeout.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Runs one connection worker to completion: dial, send the fixed message,
/// then read until the connection errors or the server closes it. Every
/// failure is logged and ends the worker; nothing is reported back to the
/// caller, and no failure affects any sibling worker.
pub async fn run(id: usize, config: Arc<Config>) {
    let ws_stream = match dial(&config.url).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("Connection {} failed: {}", id, e);
            return;
        }
    };

    info!("Connection {} established", id);

    send_and_drain(id, &config, ws_stream).await;
}

/// Dials the target URL with certificate verification disabled and the
/// handshake's Origin header set to the URL itself. Skipping verification is
/// deliberate: the tool exists to load test ad hoc endpoints, which often run
/// with self-signed or expired certificates.
async fn dial(url: &str) -> Result<WsStream, Box<dyn std::error::Error>> {
    let mut request = url.into_client_request()?;

    // Permissive default for servers that check the Origin header.
    request
        .headers_mut()
        .insert(ORIGIN, HeaderValue::from_str(url)?);

    let tls = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()?;

    let websocket_config = Some(WebSocketConfig {
        max_send_queue: None,
        max_message_size: None,
        max_frame_size: None,
        accept_unmasked_frames: false,
    });

    let (ws_stream, _) =
        connect_async_tls_with_config(request, websocket_config, Some(Connector::NativeTls(tls)))
            .await?;

    Ok(ws_stream)
}

async fn send_and_drain(id: usize, config: &Config, mut ws_stream: WsStream) {
    let send = ws_stream.send(Message::Text(MESSAGE.to_string()));

    match time::timeout(WRITE_WAIT, send).await {
        Ok(Ok(())) => info!("Connection {} sent message: {}", id, MESSAGE),
        Ok(Err(e)) => {
            error!("Connection {} send error: {}", id, e);
            let _ = ws_stream.close(None).await;
            return;
        }
        Err(_) => {
            error!(
                "Connection {} send error: write timed out after {:?}",
                id, WRITE_WAIT
            );
            let _ = ws_stream.close(None).await;
            return;
        }
    }

    // No read deadline: a server that never closes keeps this worker (and the
    // program) alive forever.
    while let Some(frame) = ws_stream.next().await {
        match frame {
            Ok(Message::Close(frame)) => {
                info!("Connection {} closed by server: {:?}", id, frame);
                break;
            }
            Ok(msg) if msg.is_text() || msg.is_binary() => {
                if config.print_replies {
                    info!("Connection {} received: {}", id, message_text(msg));
                }
            }
            Ok(_) => {
                // Control frames are answered by the library.
            }
            Err(e) => {
                error!("Connection {} read error: {}", id, e);
                break;
            }
        }
    }

    let _ = ws_stream.close(None).await;
}

fn message_text(msg: Message) -> String {
    match msg {
        Message::Text(text) => text,
        other => String::from_utf8_lossy(&other.into_data()).into_owned(),
    }
}
