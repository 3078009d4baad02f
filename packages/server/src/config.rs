//! Server configuration (command line with environment variable fallbacks).

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::domain::RoomId;

#[derive(Parser, Debug, Clone)]
#[command(name = "roomcast-server")]
#[command(about = "Room-based WebSocket chat relay", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROOMCAST_PORT", default_value = "8080")]
    pub port: u16,

    /// Rooms that exist from startup (other positive ids are created on first join)
    #[arg(
        long,
        env = "ROOMCAST_ROOMS",
        value_delimiter = ',',
        default_value = "1,2,3,4,5,6"
    )]
    pub rooms: Vec<RoomId>,

    /// Close connections idle for this many seconds (0 disables)
    #[arg(long, env = "ROOMCAST_IDLE_TIMEOUT_SECS", default_value = "0")]
    pub idle_timeout_secs: u64,

    /// Append chat messages to this JSON-lines file (in-memory when omitted)
    #[arg(long, env = "ROOMCAST_HISTORY_FILE")]
    pub history_file: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "ROOMCAST_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
