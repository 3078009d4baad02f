//! Connection session: per-connection state machine driven by inbound text frames.
//!
//! ```text
//! [Idle] --Online--> [InRoom]
//! [InRoom] --Send--> [InRoom]
//! [InRoom] --Offline--> [Idle]
//! [Idle|InRoom] --null data--> closed without leaving the room
//! [Idle|InRoom] --close / read error / idle timeout / writer gone--> leave + Offline
//! ```
//!
//! ソケットには依存しないので、チャネルだけでテストできます。

use std::sync::Arc;

use thiserror::Error;

use crate::{
    domain::{ClientSession, Membership, PusherChannel, RoomId, SessionId},
    infrastructure::dto::websocket::{
        ClientRequest, DecodeError, HEARTBEAT_ACK, InboundFrame, OnlineRequest, ProtocolError,
        SendRequest, decode,
    },
    ui::state::AppState,
    usecase::{JoinError, LeaveError, SendMessageError},
};

/// Why one inbound frame was dropped. The connection stays open.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("not in a room")]
    NotJoined,

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Leave(#[from] LeaveError),

    #[error(transparent)]
    Send(#[from] SendMessageError),
}

/// What the read loop does after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// Null-data envelope: stop reading without touching any room.
    EndOfSession,
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    EndOfSession,
    ClientClosed,
    ReadError,
    IdleTimeout,
    WriterClosed,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    InRoom(Membership),
}

/// One WebSocket connection.
pub struct ConnectionSession {
    id: SessionId,
    remote_address: String,
    channel: PusherChannel,
    state: SessionState,
    app_state: Arc<AppState>,
}

impl ConnectionSession {
    pub fn new(
        id: SessionId,
        remote_address: String,
        channel: PusherChannel,
        app_state: Arc<AppState>,
    ) -> Self {
        Self {
            id,
            remote_address,
            channel,
            state: SessionState::Idle,
            app_state,
        }
    }

    /// Membership established by the last Online, if any.
    pub fn membership(&self) -> Option<&Membership> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::InRoom(membership) => Some(membership),
        }
    }

    /// Dispatch one text frame. Errors are logged and the frame is skipped.
    pub async fn handle_text(&mut self, text: &str) -> FrameOutcome {
        match self.dispatch(text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Session {}: dropped frame: {}", self.id, e);
                FrameOutcome::Continue
            }
        }
    }

    async fn dispatch(&mut self, text: &str) -> Result<FrameOutcome, DispatchError> {
        let (status, data) = match decode(text)? {
            InboundFrame::Heartbeat => {
                self.ack_heartbeat();
                return Ok(FrameOutcome::Continue);
            }
            InboundFrame::EndOfSession => {
                tracing::debug!("Session {}: envelope without data", self.id);
                return Ok(FrameOutcome::EndOfSession);
            }
            InboundFrame::Envelope { status, data } => (status, data),
        };

        match ClientRequest::from_envelope(status, data)? {
            ClientRequest::Online(request) => self.online(request).await?,
            ClientRequest::Offline => self.offline().await?,
            ClientRequest::Send(request) => self.send(request).await?,
        }

        Ok(FrameOutcome::Continue)
    }

    fn ack_heartbeat(&self) {
        if self.channel.send(HEARTBEAT_ACK.to_string()).is_err() {
            tracing::debug!("Session {}: writer gone before heartbeat ack", self.id);
        }
    }

    async fn online(&mut self, request: OnlineRequest) -> Result<(), DispatchError> {
        // 別の Room への移動は、先に元の Room から退出する
        if let SessionState::InRoom(current) = &self.state
            && current.room_id != request.room_id
        {
            let room_id = current.room_id;
            self.state = SessionState::Idle;
            self.leave(room_id).await?;
        }

        let membership = Membership {
            session_id: self.id,
            user_id: request.user_id,
            username: request.username,
            room_id: request.room_id,
        };
        let session = ClientSession::new(
            membership.clone(),
            self.remote_address.clone(),
            self.channel.clone(),
        );

        let report = self.app_state.join_room_usecase.execute(session).await?;
        tracing::debug!(
            "Session {}: joined room {} (evicted {:?}, notified {})",
            self.id,
            membership.room_id,
            report.evicted,
            report.notified
        );
        self.state = SessionState::InRoom(membership);

        Ok(())
    }

    async fn offline(&mut self) -> Result<(), DispatchError> {
        let SessionState::InRoom(membership) = std::mem::replace(&mut self.state, SessionState::Idle)
        else {
            return Err(DispatchError::NotJoined);
        };

        self.leave(membership.room_id).await
    }

    async fn send(&mut self, request: SendRequest) -> Result<(), DispatchError> {
        let SessionState::InRoom(membership) = &self.state else {
            return Err(DispatchError::NotJoined);
        };

        self.app_state
            .send_message_usecase
            .execute(membership, request)
            .await?;

        Ok(())
    }

    /// Leave the room; a session that was already evicted leaves silently.
    async fn leave(&self, room_id: RoomId) -> Result<(), DispatchError> {
        match self
            .app_state
            .leave_room_usecase
            .execute(room_id, self.id)
            .await
        {
            Ok(notified) => {
                tracing::debug!(
                    "Session {}: Offline sent to {} member(s) of room {}",
                    self.id,
                    notified,
                    room_id
                );
                Ok(())
            }
            Err(LeaveError::NotAMember { .. }) => {
                tracing::debug!(
                    "Session {}: no longer in room {}, nothing to announce",
                    self.id,
                    room_id
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run the disconnect path for `reason`.
    pub async fn close(self, reason: CloseReason) {
        tracing::info!(
            "Session {} ({}) closed: {:?}",
            self.id,
            self.remote_address,
            reason
        );

        if reason == CloseReason::EndOfSession {
            return;
        }
        if let SessionState::InRoom(membership) = &self.state
            && let Err(e) = self.leave(membership.room_id).await
        {
            tracing::error!("Session {}: failed to leave room: {}", self.id, e);
        }
    }
}
