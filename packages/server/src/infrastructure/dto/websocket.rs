//! WebSocket wire format: `{status, data}` envelopes.
//!
//! Decoding is done in two steps. [`decode`] only checks the envelope structure
//! and recognises the control frames; [`ClientRequest::from_envelope`] then
//! validates `data` against the shape required by `status`.

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{MessageContent, RoomId, UserId, Username, ValueObjectError};

/// Literal control frame sent by clients to keep the connection alive.
pub const HEARTBEAT_TOKEN: &str = "heartbeat";

/// Fixed reply to [`HEARTBEAT_TOKEN`].
pub const HEARTBEAT_ACK: &str = r#"{"status":0,"data":"heartbeat ok"}"#;

/// Sent to a session evicted by a newer login of the same user.
pub const FORCED_OFFLINE: &str = r#"{"status":-1,"data":[]}"#;

/// Envelope status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ForcedOffline,
    HeartbeatAck,
    Online,
    Offline,
    Send,
}

impl Status {
    pub fn code(self) -> i8 {
        match self {
            Status::ForcedOffline => -1,
            Status::HeartbeatAck => 0,
            Status::Online => 1,
            Status::Offline => 2,
            Status::Send => 3,
        }
    }
}

/// Structural decode failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not a JSON envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope has data but no status")]
    MissingStatus,
}

/// Semantic validation failures of an envelope's `data`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown status {0}")]
    UnknownStatus(i64),

    #[error("invalid data for status {status}: {source}")]
    InvalidData {
        status: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),
}

/// Serialization failure of an outbound envelope.
#[derive(Debug, Error)]
#[error("failed to encode {status:?} envelope: {source}")]
pub struct EncodeError {
    pub status: Status,
    #[source]
    pub source: serde_json::Error,
}

/// Result of decoding one inbound text frame.
#[derive(Debug)]
pub enum InboundFrame {
    /// The `heartbeat` control token.
    Heartbeat,
    /// An envelope whose `data` is absent or null. The session ends silently.
    EndOfSession,
    /// An envelope still to be validated against its status.
    Envelope { status: i64, data: Value },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    data: Value,
}

/// Decode one inbound text frame.
pub fn decode(text: &str) -> Result<InboundFrame, DecodeError> {
    if text == HEARTBEAT_TOKEN {
        return Ok(InboundFrame::Heartbeat);
    }

    let raw: RawEnvelope = serde_json::from_str(text)?;
    if raw.data.is_null() {
        return Ok(InboundFrame::EndOfSession);
    }
    let status = raw.status.ok_or(DecodeError::MissingStatus)?;

    Ok(InboundFrame::Envelope {
        status,
        data: raw.data,
    })
}

/// `room_id` arrives either as `"2"` or `2`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoomIdRepr {
    Text(String),
    Number(u64),
}

impl TryFrom<RoomIdRepr> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: RoomIdRepr) -> Result<Self, Self::Error> {
        match value {
            RoomIdRepr::Text(text) => text.parse(),
            RoomIdRepr::Number(number) => RoomId::try_from(number),
        }
    }
}

/// Browsers send numbers as doubles, so `1.0` is accepted as uid 1.
fn deserialize_uid<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(uid) = number.as_u64() {
        return Ok(uid);
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(f as u64),
        _ => Err(de::Error::custom(format!(
            "uid must be a non-negative integer, got {number}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct OnlineData {
    #[serde(deserialize_with = "deserialize_uid")]
    uid: u64,
    username: String,
    room_id: RoomIdRepr,
}

#[derive(Debug, Deserialize)]
struct SendData {
    #[serde(deserialize_with = "deserialize_uid")]
    uid: u64,
    username: String,
    room_id: RoomIdRepr,
    content: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    avatar_id: Option<String>,
}

/// Validated Online request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineRequest {
    pub user_id: UserId,
    pub username: Username,
    pub room_id: RoomId,
}

/// Validated Send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub user_id: UserId,
    pub username: Username,
    pub room_id: RoomId,
    pub content: MessageContent,
    pub image_url: Option<String>,
    pub avatar_id: String,
}

/// A client envelope validated against its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    Online(OnlineRequest),
    Offline,
    Send(SendRequest),
}

impl ClientRequest {
    pub fn from_envelope(status: i64, data: Value) -> Result<Self, ProtocolError> {
        let invalid = |source| ProtocolError::InvalidData { status, source };

        match status {
            1 => {
                let data: OnlineData = serde_json::from_value(data).map_err(invalid)?;
                Ok(ClientRequest::Online(OnlineRequest {
                    user_id: UserId::new(data.uid),
                    username: Username::new(data.username),
                    room_id: RoomId::try_from(data.room_id)?,
                }))
            }
            2 => Ok(ClientRequest::Offline),
            3 => {
                let data: SendData = serde_json::from_value(data).map_err(invalid)?;
                Ok(ClientRequest::Send(SendRequest {
                    user_id: UserId::new(data.uid),
                    username: Username::new(data.username),
                    room_id: RoomId::try_from(data.room_id)?,
                    content: MessageContent::new(data.content),
                    image_url: data.image_url,
                    avatar_id: data.avatar_id.unwrap_or_default(),
                }))
            }
            other => Err(ProtocolError::UnknownStatus(other)),
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T> {
    status: i8,
    data: &'a T,
}

/// Encode `data` wrapped in a `{status, data}` envelope.
pub fn encode<T: Serialize>(status: Status, data: &T) -> Result<String, EncodeError> {
    serde_json::to_string(&Envelope {
        status: status.code(),
        data,
    })
    .map_err(|source| EncodeError { status, source })
}

/// Presence announcement for a member that joined.
#[derive(Debug, Clone, Serialize)]
pub struct OnlineNotice {
    pub username: String,
    pub uid: u64,
    pub room_id: String,
    pub time: i64,
}

/// Chat message relayed to the other members.
#[derive(Debug, Clone, Serialize)]
pub struct SendNotice {
    pub username: String,
    pub uid: u64,
    pub room_id: String,
    pub time: i64,
    pub avatar_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Announcement for a member that disconnected.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineNotice {
    pub username: String,
    pub uid: u64,
    pub time: i64,
}
