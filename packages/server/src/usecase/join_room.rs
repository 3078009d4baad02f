//! UseCase: Room への参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - Room への参加、同じ user_id の追い出し、Online 通知のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 「別の場所からのログインで古いセッションが追い出される」ことを保証
//! - 新しい参加者自身には Online 通知が届かないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room / 既存メンバーのいる Room への参加
//! - エッジケース：同じ user_id での再参加（追い出し）

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::{
    domain::{ClientSession, RoomRegistry, SessionId},
    infrastructure::dto::websocket::{FORCED_OFFLINE, OnlineNotice, Status, encode},
};

use super::error::JoinError;

/// join の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    /// 追い出されたセッション
    pub evicted: Vec<SessionId>,
    /// Online 通知を送信できた数
    pub notified: usize,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Room への参加を実行
    ///
    /// 1. Online 通知を組み立てる
    /// 2. Registry に参加（同じ user_id の別セッションは強制オフライン通知の後に削除）
    /// 3. 新しい参加者以外に Online 通知をブロードキャスト
    pub async fn execute(&self, session: ClientSession) -> Result<JoinReport, JoinError> {
        let notice = OnlineNotice {
            username: session.username.to_string(),
            uid: session.user_id.value(),
            room_id: session.room_id.to_string(),
            time: self.clock.now_millis(),
        };
        let json = encode(Status::Online, &notice)?;

        let room_id = session.room_id;
        let session_id = session.id;
        tracing::info!(
            "Session {} ('{}', uid {}) joins room {}",
            session_id,
            session.username,
            session.user_id,
            room_id
        );

        let outcome = self.registry.join(session, FORCED_OFFLINE).await;
        let notified = self.registry.broadcast(room_id, session_id, &json).await;

        Ok(JoinReport {
            evicted: outcome.evicted,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Membership, RoomId, UserId, Username},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRegistry,
        },
    };
    use roomcast_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn create_test_registry() -> Arc<InMemoryRoomRegistry> {
        Arc::new(InMemoryRoomRegistry::new(
            [RoomId::new(2).unwrap()],
            Arc::new(WebSocketMessagePusher::new()),
        ))
    }

    fn session(id: u64, uid: u64, name: &str) -> (ClientSession, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let membership = Membership {
            session_id: SessionId::new(id),
            user_id: UserId::new(uid),
            username: Username::new(name.to_string()),
            room_id: RoomId::new(2).unwrap(),
        };
        (ClientSession::new(membership, "127.0.0.1:1".to_string(), tx), rx)
    }

    #[tokio::test]
    async fn test_join_empty_room() {
        // テスト項目: 空の Room に参加すると人数が 1 になり、通知先はいない
        // given (前提条件):
        let registry = create_test_registry();
        let usecase = JoinRoomUseCase::new(registry.clone(), Arc::new(FixedClock::new(1000)));
        let (alice, mut alice_rx) = session(1, 1, "alice");

        // when (操作):
        let report = usecase.execute(alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.notified, 0);
        assert!(report.evicted.is_empty());
        assert_eq!(registry.count(RoomId::new(2).unwrap()).await, 1);
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_broadcasts_online_to_others() {
        // テスト項目: 既存メンバーに Online 通知が届く
        // given (前提条件):
        let registry = create_test_registry();
        let usecase = JoinRoomUseCase::new(registry.clone(), Arc::new(FixedClock::new(1000)));
        let (bob, mut bob_rx) = session(1, 2, "bob");
        usecase.execute(bob).await.unwrap();
        let (alice, mut alice_rx) = session(2, 1, "alice");

        // when (操作):
        let report = usecase.execute(alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.notified, 1);
        assert_eq!(
            bob_rx.recv().await.unwrap(),
            r#"{"status":1,"data":{"username":"alice","uid":1,"room_id":"2","time":1000}}"#
        );
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_with_same_uid_evicts_previous_session() {
        // テスト項目: 同じ uid での参加で古いセッションに強制オフライン通知が届き、唯一のメンバーになる
        // given (前提条件):
        let registry = create_test_registry();
        let usecase = JoinRoomUseCase::new(registry.clone(), Arc::new(FixedClock::new(1000)));
        let (client_a, mut rx_a) = session(1, 1, "alice");
        usecase.execute(client_a).await.unwrap();
        let (client_b, _rx_b) = session(2, 1, "alice");

        // when (操作):
        let report = usecase.execute(client_b).await.unwrap();

        // then (期待する結果):
        assert_eq!(report.evicted, vec![SessionId::new(1)]);
        assert_eq!(report.notified, 0);
        assert_eq!(rx_a.recv().await.unwrap(), r#"{"status":-1,"data":[]}"#);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(registry.count(RoomId::new(2).unwrap()).await, 1);
        assert!(
            registry
                .is_member(RoomId::new(2).unwrap(), SessionId::new(2))
                .await
        );
    }
}
