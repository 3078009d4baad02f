//! Roomcast server: HTTP routes and the WebSocket dispatch loop.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::session::{CloseReason, ConnectionSession, DispatchError, FrameOutcome};
pub use server::Server;
