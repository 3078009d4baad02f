//! Value objects.

use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use super::error::ValueObjectError;

/// Identity of one live connection, assigned when the upgrade is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing `SessionId`s, starting from 1.
#[derive(Debug, Default)]
pub struct SessionIdFactory {
    last: AtomicU64,
}

impl SessionIdFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self) -> SessionId {
        SessionId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Numeric identity of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier: a positive integer.
///
/// Rendered as a decimal string on the wire (`"2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(u32);

impl RoomId {
    pub fn new(value: u32) -> Result<Self, ValueObjectError> {
        if value == 0 {
            return Err(ValueObjectError::InvalidRoomId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for RoomId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| ValueObjectError::InvalidRoomId(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<u64> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        let value =
            u32::try_from(value).map_err(|_| ValueObjectError::InvalidRoomId(value.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display name of a user, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text body of a chat message. May be empty when the message carries an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_factory_is_monotonic() {
        // テスト項目: SessionIdFactory が単調増加する ID を払い出す
        // given (前提条件):
        let factory = SessionIdFactory::new();

        // when (操作):
        let first = factory.generate();
        let second = factory.generate();
        let third = factory.generate();

        // then (期待する結果):
        assert_eq!(first.value(), 1);
        assert!(first < second && second < third);
    }

    #[test]
    fn test_room_id_rejects_zero() {
        // テスト項目: 0 は RoomId として不正
        // given (前提条件):

        // when (操作):
        let result = RoomId::new(0);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::InvalidRoomId("0".to_string())));
    }

    #[test]
    fn test_room_id_from_str() {
        // テスト項目: 文字列表現の room_id を解釈できる
        // given (前提条件):

        // when (操作):
        let parsed = "2".parse::<RoomId>();
        let invalid = "lobby".parse::<RoomId>();
        let negative = "-1".parse::<RoomId>();

        // then (期待する結果):
        assert_eq!(parsed.unwrap().value(), 2);
        assert!(invalid.is_err());
        assert!(negative.is_err());
    }

    #[test]
    fn test_room_id_try_from_u64_out_of_range() {
        // テスト項目: u32 に収まらない数値は RoomId にならない
        // given (前提条件):
        let too_large = u64::from(u32::MAX) + 1;

        // when (操作):
        let result = RoomId::try_from(too_large);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
