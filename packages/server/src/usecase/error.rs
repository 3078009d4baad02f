//! UseCase errors.

use thiserror::Error;

use crate::{
    domain::{RoomId, SessionId, UserId},
    infrastructure::dto::websocket::EncodeError,
};

/// Errors of `JoinRoomUseCase`
#[derive(Debug, Error)]
pub enum JoinError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors of `LeaveRoomUseCase`
#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("session {session_id} is not a member of room {room_id}")]
    NotAMember {
        room_id: RoomId,
        session_id: SessionId,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Errors of `SendMessageUseCase`
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("uid {claimed} does not match the joined user {joined}")]
    UserMismatch { joined: UserId, claimed: UserId },

    #[error("room_id {claimed} does not match the joined room {joined}")]
    RoomMismatch { joined: RoomId, claimed: RoomId },

    #[error("session {session_id} is no longer a member of room {room_id}")]
    NotAMember {
        room_id: RoomId,
        session_id: SessionId,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
