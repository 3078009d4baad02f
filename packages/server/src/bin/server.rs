//! Roomcast chat relay server.
//!
//! Clients join a room over WebSocket and their messages are relayed to the
//! other members of that room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000 --rooms 1,2,3
//! ```

use std::sync::Arc;

use clap::Parser;
use roomcast_server::{
    config::ServerConfig,
    domain::{ContentStore, LiveSessions},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryContentStore, InMemoryRoomRegistry, JsonLinesContentStore},
    },
    ui::Server,
    usecase::{GetPresenceUseCase, JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase},
};
use roomcast_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Clock
    // 2. MessagePusher
    // 3. Registry
    // 4. ContentStore
    // 5. UseCases
    // 6. Server

    // 1. Create Clock
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create Registry (in-memory rooms)
    let registry = Arc::new(InMemoryRoomRegistry::new(
        config.rooms.iter().copied(),
        message_pusher,
    ));
    tracing::info!(
        "Rooms {:?} ready",
        config.rooms.iter().map(|id| id.value()).collect::<Vec<_>>()
    );

    // 4. Create ContentStore (JSON lines file, or in-memory)
    let content_store: Arc<dyn ContentStore> = match &config.history_file {
        Some(path) => match JsonLinesContentStore::open(path.clone(), clock.clone()).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Failed to open {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Arc::new(InMemoryContentStore::new()),
    };

    // 5. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(registry.clone(), clock.clone()));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(registry.clone(), clock.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        registry.clone(),
        content_store,
        clock,
    ));
    let get_presence_usecase = Arc::new(GetPresenceUseCase::new(registry, Arc::new(LiveSessions::new())));

    // 6. Create and run the server
    let server = Server::new(
        join_room_usecase,
        leave_room_usecase,
        send_message_usecase,
        get_presence_usecase,
    )
    .with_idle_timeout(config.idle_timeout());
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
