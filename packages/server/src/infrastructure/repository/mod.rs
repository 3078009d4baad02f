//! Repository implementations.
//!
//! - `inmemory`: room registry and content store kept in process memory
//! - `jsonl`: append-only JSON-lines content store

pub mod inmemory;
pub mod jsonl;

pub use inmemory::{InMemoryContentStore, InMemoryRoomRegistry};
pub use jsonl::JsonLinesContentStore;
