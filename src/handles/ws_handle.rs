use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::services::Hub;

#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<Hub>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<WsState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (id, mut outbound) = state.hub.register().await;
    let (mut sink, mut stream) = socket.split();

    tracing::info!("subscriber {id} connected");

    // forward hub broadcasts until the buffer closes (unregistered or
    // evicted as too slow) or the socket dies
    let forward = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            let message = match String::from_utf8(payload) {
                Ok(text) => Message::Text(text),
                Err(_) => continue,
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    // subscribers only listen; drain the inbound side until it closes
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    forward.abort();
    state.hub.unregister(id).await;

    tracing::info!("subscriber {id} disconnected");
}
