//! Live WebSocket module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/live/ws | GET | none (dashboard subscription) |
//!
//! Fans the broadcast bus out to WebSocket subscribers as JSON-encoded
//! [`shared::message::BusMessage`] frames. Subscribers are read-only;
//! inbound frames other than close are ignored.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/live/ws", get(upgrade))
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| fan_out(socket, state))
}

async fn fan_out(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = state.live.subscribe();
    tracing::debug!(
        subscribers = state.live.subscriber_count(),
        "Live subscriber connected"
    );

    let mut forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    let Ok(text) = serde_json::to_string(&message) else {
                        continue;
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Live subscriber lagged, frames dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drain the inbound side so close frames (and pings) are processed
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }

    tracing::debug!("Live subscriber disconnected");
}
