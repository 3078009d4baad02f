//! UseCase layer: the operations a connection session dispatches to.

mod error;
mod get_presence;
mod join_room;
mod leave_room;
mod send_message;

pub use error::{JoinError, LeaveError, SendMessageError};
pub use get_presence::GetPresenceUseCase;
pub use join_room::{JoinReport, JoinRoomUseCase};
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
