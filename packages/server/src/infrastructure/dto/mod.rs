//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: envelope codec for the WebSocket connection
//! - `http`: HTTP API response DTOs

pub mod http;
pub mod websocket;
