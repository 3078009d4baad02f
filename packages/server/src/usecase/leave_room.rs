//! UseCase: Room からの退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - Room からの削除と、残りの参加者への Offline 通知
//!
//! ### なぜこのテストが必要か
//! - 切断時に他の参加者に通知されることを確認
//! - 追い出されたセッションの切断で Offline が通知されないことを保証
//!   （同じユーザーの新しいセッションはオンラインのまま）
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の退出と通知
//! - エッジケース：最後の参加者の退出（通知対象なし）
//! - 異常系：既に Room にいないセッションの退出

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::{
    domain::{RoomId, RoomRegistry, SessionId},
    infrastructure::dto::websocket::{OfflineNotice, Status, encode},
};

use super::error::LeaveError;

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// 退出を実行
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Offline 通知を送信できた参加者の数
    /// * `Err(LeaveError::NotAMember)` - 既に Room にいない（追い出し済みなど）
    pub async fn execute(
        &self,
        room_id: RoomId,
        session_id: SessionId,
    ) -> Result<usize, LeaveError> {
        // 1. Room から削除
        let Some(session) = self.registry.leave(room_id, session_id).await else {
            return Err(LeaveError::NotAMember {
                room_id,
                session_id,
            });
        };
        tracing::info!(
            "Session {} ('{}', uid {}) left room {}",
            session_id,
            session.username,
            session.user_id,
            room_id
        );

        // 2. 残りの参加者に Offline 通知
        let notice = OfflineNotice {
            username: session.username.to_string(),
            uid: session.user_id.value(),
            time: self.clock.now_millis(),
        };
        let json = encode(Status::Offline, &notice)?;

        Ok(self.registry.broadcast(room_id, session_id, &json).await)
    }
}
