//! UseCase: オンライン人数の取得
//!
//! - オンライン人数: アップグレード済みで切断されていない接続の数（Room 未参加も含む）
//! - Room の人数: Room に登録されているメンバーの数

use std::sync::Arc;

use crate::domain::{LiveSessionGuard, LiveSessions, RoomId, RoomRegistry};

/// オンライン人数取得のユースケース
pub struct GetPresenceUseCase {
    registry: Arc<dyn RoomRegistry>,
    live_sessions: Arc<LiveSessions>,
}

impl GetPresenceUseCase {
    pub fn new(registry: Arc<dyn RoomRegistry>, live_sessions: Arc<LiveSessions>) -> Self {
        Self {
            registry,
            live_sessions,
        }
    }

    /// 接続を数え始める（ガードを drop すると数から外れる）
    pub fn track_connection(&self) -> LiveSessionGuard {
        self.live_sessions.enter()
    }

    /// 接続中のセッション数
    pub fn online_user_count(&self) -> usize {
        self.live_sessions.count()
    }

    /// 全 Room のメンバー数の合計
    pub async fn room_member_count(&self) -> usize {
        self.registry.total_count().await
    }

    /// 指定 Room の参加人数（未知の Room は 0）
    pub async fn online_room_user_count(&self, room_id: RoomId) -> usize {
        self.registry.count(room_id).await
    }

    /// 既知の全 Room と参加人数（Room ID 昇順）
    pub async fn rooms(&self) -> Vec<(RoomId, usize)> {
        let mut rooms = Vec::new();
        for room_id in self.registry.room_ids().await {
            rooms.push((room_id, self.registry.count(room_id).await));
        }
        rooms
    }
}
