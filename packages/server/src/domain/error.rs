//! Domain errors.

use thiserror::Error;

use super::value_object::SessionId;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must be a positive integer, got '{0}'")]
    InvalidRoomId(String),
}

/// Errors raised while pushing a frame to a connection's outbound channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("outbound channel of session {0} is closed")]
    ChannelClosed(SessionId),
}

/// Errors raised by a `ContentStore`
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("content store is full (capacity {0})")]
    CapacityExceeded(usize),

    #[error("failed to encode content record: {0}")]
    Encode(String),

    #[error("content store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
