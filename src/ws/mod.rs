pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> bool
where
    S: SinkExt<Message> + Unpin,
{
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

/// Frame to forward for a broadcast receive result. A lagged observer gets
/// a fresh full snapshot; `None` once the channel is closed.
async fn outbound_frame(
    state: &AppState,
    received: Result<ServerMessage, RecvError>,
) -> Option<ServerMessage> {
    match received {
        Ok(msg) => Some(msg),
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!("Observer lagged by {} events, resending full state", skipped);
            Some(ServerMessage::GameState {
                snapshot: state.snapshot().await,
            })
        }
        Err(RecvError::Closed) => None,
    }
}

/// Parse and dispatch one text frame, returning the targeted reply
async fn handle_text_frame(state: &AppState, text: &str) -> Option<ServerMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(client_msg) => handlers::handle_message(client_msg, state).await,
        Err(e) => {
            tracing::warn!("Failed to parse client message: {}", e);
            Some(ServerMessage::Error {
                code: "PARSE_ERROR".to_string(),
                msg: format!("Invalid message format: {}", e),
            })
        }
    }
}

/// Handle an observer connection (presenter display or moderator panel)
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no update falls in between
    let mut broadcast_rx = state.broadcaster.subscribe();

    let welcome = ServerMessage::GameState {
        snapshot: state.snapshot().await,
    };
    if !send_json(&mut sender, &welcome).await {
        tracing::error!("Failed to send initial state");
        return;
    }

    tracing::info!(
        "Observer connected ({} connected)",
        state.broadcaster.observer_count()
    );

    loop {
        tokio::select! {
            broadcast_msg = broadcast_rx.recv() => {
                let Some(msg) = outbound_frame(&state, broadcast_msg).await else {
                    break;
                };
                if !send_json(&mut sender, &msg).await {
                    break;
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        if let Some(response) = handle_text_frame(&state, &text).await {
                            if !send_json(&mut sender, &response).await {
                                tracing::error!("Failed to send response");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!("Observer disconnected");
}
