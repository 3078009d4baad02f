//! In-memory implementations.

mod content;
mod room;

pub use content::InMemoryContentStore;
pub use room::InMemoryRoomRegistry;
