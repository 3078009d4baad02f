//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::SessionIdFactory,
    usecase::{GetPresenceUseCase, JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase},
};

use super::{
    handler::{get_online, get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room-based chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     leave_room_usecase,
///     send_message_usecase,
///     get_presence_usecase,
/// )
/// .with_idle_timeout(Some(Duration::from_secs(60)));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// JoinRoomUseCase（Room 参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// GetPresenceUseCase（オンライン人数取得のユースケース）
    get_presence_usecase: Arc<GetPresenceUseCase>,
    idle_timeout: Option<Duration>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `join_room_usecase` - UseCase for joining a room
    /// * `leave_room_usecase` - UseCase for leaving a room
    /// * `send_message_usecase` - UseCase for relaying a chat message
    /// * `get_presence_usecase` - UseCase for online counts
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_presence_usecase: Arc<GetPresenceUseCase>,
    ) -> Self {
        Self {
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            get_presence_usecase,
            idle_timeout: None,
        }
    }

    /// Close connections that send nothing for `idle_timeout`.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Build the router with all endpoints.
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            join_room_usecase: self.join_room_usecase,
            leave_room_usecase: self.leave_room_usecase,
            send_message_usecase: self.send_message_usecase,
            get_presence_usecase: self.get_presence_usecase,
            session_ids: SessionIdFactory::new(),
            idle_timeout: self.idle_timeout,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/online", get(get_online))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }

    /// Run the chat relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Roomcast server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
