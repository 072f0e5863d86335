//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};

use crate::AppState;

use super::registry::{ConnectionHandle, NotificationReceiver};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(%rejection, "websocket upgrade rejected");
            return rejection.into_response();
        }
    };

    ws.on_failed_upgrade(|err| tracing::warn!(%err, "websocket upgrade failed"))
        .on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (handle, outbound) = ConnectionHandle::new(state.config.client_buffer);
    let connection_id = handle.connection_id.clone();
    let connected_at = handle.connected_at;
    state.connections.register(handle);

    tracing::info!(
        %connection_id,
        connections = state.connections.len(),
        "websocket client connected"
    );

    let (ws_tx, ws_rx) = socket.split();
    let reason = run_connection(&connection_id, ws_tx, ws_rx, outbound).await;

    state.connections.unregister(&connection_id);
    let connected_secs = (Utc::now() - connected_at).num_seconds();
    tracing::info!(%connection_id, %reason, connected_secs, "websocket client disconnected");
}

/// Pump notifications out and discard anything the client sends.
///
/// Returns once the client goes away, a write fails, or the registry drops
/// this connection's handle.
async fn run_connection(
    connection_id: &str,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut ws_rx: SplitStream<WebSocket>,
    mut outbound: NotificationReceiver,
) -> &'static str {
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => return "client closed",
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %connection_id, "ws read error");
                        return "read error";
                    }
                }
            }

            notification = outbound.recv() => {
                let Some(notification) = notification else {
                    let _ = send_close(&mut ws_tx, close_code::AWAY, "Connection dropped").await;
                    return "dropped by server";
                };
                if let Err(e) = ws_tx.send(Message::Text(notification.to_string().into())).await {
                    tracing::debug!(?e, %connection_id, "ws write error");
                    return "write error";
                }
            }
        }
    }
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}
