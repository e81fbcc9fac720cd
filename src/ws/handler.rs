//! WebSocket upgrade handler

use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{JoinReply, PlayerInput, SessionEvent};
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Errors that end a single session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("websocket send failed: {0}")]
    Transport(#[from] axum::Error),
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, remote_addr, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, remote_addr: SocketAddr, state: AppState) {
    let conn_id = Uuid::new_v4();
    state.sessions.open(conn_id, remote_addr);
    info!(conn_id = %conn_id, remote = %remote_addr, "New WebSocket connection");

    let (mut ws_sink, ws_stream) = socket.split();

    let input_tx = state.game.input_tx.clone();

    let (reply, init_rx) = oneshot::channel();
    let joined = input_tx
        .send(PlayerInput {
            conn_id,
            event: SessionEvent::Join { reply },
        })
        .await;

    if joined.is_err() {
        error!(conn_id = %conn_id, "Match loop unavailable");
        state.sessions.close(&conn_id);
        return;
    }

    match init_rx.await {
        Ok(JoinReply { init, events }) => match send_msg(&mut ws_sink, &init).await {
            Ok(()) => run_session(conn_id, ws_sink, ws_stream, input_tx.clone(), events).await,
            Err(e) => debug!(conn_id = %conn_id, error = %e, "Failed to send init"),
        },
        Err(_) => error!(conn_id = %conn_id, "Match loop dropped join request"),
    }

    // Signal disconnect to match loop
    let _ = input_tx
        .send(PlayerInput {
            conn_id,
            event: SessionEvent::Leave,
        })
        .await;

    let connected_ms = state.sessions.close(&conn_id).unwrap_or(0);
    info!(conn_id = %conn_id, connected_ms, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    conn_id: Uuid,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut ws_stream: SplitStream<WebSocket>,
    input_tx: mpsc::Sender<PlayerInput>,
    mut snapshot_rx: broadcast::Receiver<ServerMsg>,
) {
    let rate_limiter = SessionRateLimiter::new();

    // Spawn writer task: broadcast -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match snapshot_rx.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(conn_id = %conn_id, lagged_count = n, "Client lagged, skipping messages");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(conn_id = %conn_id, "Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> match loop
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(conn_id = %conn_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        let input = PlayerInput {
                            conn_id,
                            event: SessionEvent::Client(msg),
                        };
                        if input_tx.send(input).await.is_err() {
                            debug!(conn_id = %conn_id, "Input channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), SessionError> {
    let json = serde_json::to_string(msg)?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}
