//! Room-based WebSocket chat relay.
//!
//! Clients join a numbered room over a persistent WebSocket connection and
//! every envelope they send is relayed to the other members of that room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
