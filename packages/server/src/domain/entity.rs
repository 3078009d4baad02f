//! Entities: connected client sessions and the rooms they belong to.

use tokio::sync::mpsc;

use super::value_object::{RoomId, SessionId, UserId, Username};

/// Outbound channel of one connection.
///
/// Encoded frames pushed here are drained into the WebSocket by the connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Who a connection is and which room it joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub username: Username,
    pub room_id: RoomId,
}

/// A live connection registered in a room.
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub id: SessionId,
    /// Peer address, for logging only. Never used as an identity.
    pub remote_address: String,
    pub user_id: UserId,
    pub username: Username,
    pub room_id: RoomId,
    pub channel: PusherChannel,
}

impl ClientSession {
    pub fn new(membership: Membership, remote_address: String, channel: PusherChannel) -> Self {
        Self {
            id: membership.session_id,
            remote_address,
            user_id: membership.user_id,
            username: membership.username,
            room_id: membership.room_id,
            channel,
        }
    }

    pub fn membership(&self) -> Membership {
        Membership {
            session_id: self.id,
            user_id: self.user_id,
            username: self.username.clone(),
            room_id: self.room_id,
        }
    }
}

/// A chat room and its members, in join order.
///
/// Invariant: no two members share a `user_id` and no session appears twice.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    members: Vec<ClientSession>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    /// Append `session`, evicting any other session of the same user first.
    ///
    /// `on_evict` is called for each evicted member while it is still listed,
    /// before it is removed and before `session` is appended. An entry with the
    /// same session id is replaced without calling `on_evict`.
    ///
    /// Returns the ids of the evicted sessions.
    pub fn join<F>(&mut self, session: ClientSession, mut on_evict: F) -> Vec<SessionId>
    where
        F: FnMut(&ClientSession),
    {
        let mut evicted = Vec::new();
        for member in &self.members {
            if member.user_id == session.user_id && member.id != session.id {
                on_evict(member);
                evicted.push(member.id);
            }
        }

        self.members
            .retain(|member| member.id != session.id && !evicted.contains(&member.id));
        self.members.push(session);

        evicted
    }

    /// Remove the member with `session_id`, if present.
    pub fn leave(&mut self, session_id: SessionId) -> Option<ClientSession> {
        let index = self
            .members
            .iter()
            .position(|member| member.id == session_id)?;
        Some(self.members.remove(index))
    }

    /// Current members except `exclude`, in join order.
    ///
    /// The iterator borrows the room, so it cannot outlive the lock it was taken under.
    pub fn members_except(
        &self,
        exclude: SessionId,
    ) -> impl Iterator<Item = &ClientSession> + Clone {
        self.members
            .iter()
            .filter(move |member| member.id != exclude)
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.members.iter().any(|member| member.id == session_id)
    }

    pub fn members(&self) -> &[ClientSession] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
