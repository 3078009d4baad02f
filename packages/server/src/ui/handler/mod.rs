//! HTTP and WebSocket handlers.

mod http;
pub mod session;
mod websocket;

pub use http::{get_online, get_room_detail, get_rooms, health_check};
pub use websocket::websocket_handler;
