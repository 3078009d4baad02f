//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Online member count of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: u32,
    pub num: usize,
}

/// Process-wide online counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineCountDto {
    /// Live connections, joined or not
    pub count: usize,
    /// Members registered across all rooms
    pub in_rooms: usize,
}
