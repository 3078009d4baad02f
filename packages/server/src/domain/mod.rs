//! Domain layer: value objects, entities and the traits the other layers plug into.

pub mod content_store;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod presence;
pub mod registry;
pub mod value_object;

pub use content_store::{ContentRecord, ContentStore};
pub use entity::{ClientSession, Membership, PusherChannel, Room};
pub use error::{MessagePushError, PersistenceError, ValueObjectError};
pub use message_pusher::MessagePusher;
pub use presence::{LiveSessionGuard, LiveSessions};
pub use registry::{JoinOutcome, RoomRegistry};
pub use value_object::{MessageContent, RoomId, SessionId, SessionIdFactory, UserId, Username};

#[cfg(test)]
pub use content_store::MockContentStore;
