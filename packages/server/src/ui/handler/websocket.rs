//! WebSocket connection handler.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{domain::SessionId, ui::state::AppState};

use super::session::{CloseReason, ConnectionSession, FrameOutcome};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote_address): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    let session_id = state.session_ids.generate();
    tracing::info!("Session {} connecting from {}", session_id, remote_address);

    ws.on_failed_upgrade(move |e| {
        tracing::error!("Session {}: WebSocket upgrade failed: {}", session_id, e);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, session_id, remote_address))
}

/// Spawns a task that drains the session's channel into the WebSocket sink.
///
/// Everything addressed to this connection (broadcasts from other sessions, the
/// heartbeat ack, the forced-offline notice) goes through `rx`.
///
/// # Returns
///
/// A `JoinHandle` that completes once the socket refuses a write.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
        }
    })
}

enum Inbound {
    Frame(Message),
    Closed,
    Failed(axum::Error),
    TimedOut,
}

async fn next_inbound(
    receiver: &mut SplitStream<WebSocket>,
    idle_timeout: Option<Duration>,
) -> Inbound {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
            Ok(next) => next,
            Err(_) => return Inbound::TimedOut,
        },
        None => receiver.next().await,
    };

    match next {
        Some(Ok(msg)) => Inbound::Frame(msg),
        Some(Err(e)) => Inbound::Failed(e),
        None => Inbound::Closed,
    }
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: SessionId,
    remote_address: SocketAddr,
) {
    let _live = state.get_presence_usecase.track_connection();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let idle_timeout = state.idle_timeout;
    let mut session = ConnectionSession::new(session_id, remote_address.to_string(), tx, state);

    let mut send_task = pusher_loop(rx, sender);

    let reason = loop {
        let inbound = tokio::select! {
            inbound = next_inbound(&mut receiver, idle_timeout) => inbound,
            _ = &mut send_task => break CloseReason::WriterClosed,
        };

        match inbound {
            Inbound::Frame(Message::Text(text)) => {
                tracing::debug!("Session {} received: {}", session_id, text.as_str());
                if session.handle_text(text.as_str()).await == FrameOutcome::EndOfSession {
                    break CloseReason::EndOfSession;
                }
            }
            Inbound::Frame(Message::Close(_)) => break CloseReason::ClientClosed,
            // Ping/Pong は axum が自動で処理する
            Inbound::Frame(Message::Ping(_) | Message::Pong(_)) => {}
            Inbound::Frame(Message::Binary(_)) => {
                tracing::warn!("Session {}: binary frame ignored", session_id);
            }
            Inbound::Closed => break CloseReason::ClientClosed,
            Inbound::Failed(e) => {
                tracing::error!("Session {}: WebSocket error: {}", session_id, e);
                break CloseReason::ReadError;
            }
            Inbound::TimedOut => break CloseReason::IdleTimeout,
        }
    };

    session.close(reason).await;
    send_task.abort();
}
