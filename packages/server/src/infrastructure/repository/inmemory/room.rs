//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//!
//! ## ロックの粒度
//!
//! Room ごとに `Mutex<Room>` を持ち、Room の一覧は `RwLock<HashMap<..>>` で保持します。
//! join（追い出し通知 → 削除 → 追加）と broadcast の走査は同じ Room のロックを
//! 最後まで保持したまま行うので、変更途中のメンバーリストは観測されません。
//! 同時に 2 つの Room のロックを保持することはありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ClientSession, JoinOutcome, MessagePusher, Room, RoomId, RoomRegistry, SessionId,
};

/// インメモリ Room Registry 実装
pub struct InMemoryRoomRegistry {
    /// Room ID → Room
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<Room>>>>,
    /// 追い出し通知とブロードキャストに使う MessagePusher
    message_pusher: Arc<dyn MessagePusher>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    ///
    /// `preset_rooms` の Room は最初から存在し、それ以外の Room は最初の join で作成されます。
    pub fn new(
        preset_rooms: impl IntoIterator<Item = RoomId>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        let rooms = preset_rooms
            .into_iter()
            .map(|id| (id, Arc::new(Mutex::new(Room::new(id)))))
            .collect();

        Self {
            rooms: RwLock::new(rooms),
            message_pusher,
        }
    }

    async fn room(&self, room_id: RoomId) -> Option<Arc<Mutex<Room>>> {
        self.rooms.read().await.get(&room_id).cloned()
    }

    async fn room_or_create(&self, room_id: RoomId) -> Arc<Mutex<Room>> {
        if let Some(room) = self.room(room_id).await {
            return room;
        }

        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id)
            .or_insert_with(|| {
                tracing::info!("Room {} created", room_id);
                Arc::new(Mutex::new(Room::new(room_id)))
            })
            .clone()
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, session: ClientSession, eviction_notice: &str) -> JoinOutcome {
        let room = self.room_or_create(session.room_id).await;
        let mut room = room.lock().await;

        let session_id = session.id;
        let evicted = room.join(session, |old| {
            if let Err(e) = self.message_pusher.push_to(old, eviction_notice) {
                tracing::warn!("Failed to notify evicted session {}: {}", old.id, e);
            }
            tracing::info!(
                "Session {} ('{}') evicted from room {} by session {}",
                old.id,
                old.username,
                old.room_id,
                session_id
            );
        });

        JoinOutcome { evicted }
    }

    async fn leave(&self, room_id: RoomId, session_id: SessionId) -> Option<ClientSession> {
        let room = self.room(room_id).await?;
        let mut room = room.lock().await;
        room.leave(session_id)
    }

    async fn broadcast(&self, room_id: RoomId, exclude: SessionId, content: &str) -> usize {
        let Some(room) = self.room(room_id).await else {
            return 0;
        };
        let room = room.lock().await;
        self.message_pusher
            .broadcast(&mut room.members_except(exclude), content)
    }

    async fn is_member(&self, room_id: RoomId, session_id: SessionId) -> bool {
        match self.room(room_id).await {
            Some(room) => room.lock().await.contains(session_id),
            None => false,
        }
    }

    async fn count(&self, room_id: RoomId) -> usize {
        match self.room(room_id).await {
            Some(room) => room.lock().await.len(),
            None => 0,
        }
    }

    async fn total_count(&self) -> usize {
        let rooms: Vec<Arc<Mutex<Room>>> = self.rooms.read().await.values().cloned().collect();

        let mut total = 0;
        for room in rooms {
            total += room.lock().await.len();
        }
        total
    }

    async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Membership, UserId, Username},
        infrastructure::message_pusher::WebSocketMessagePusher,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - join / leave / broadcast / count の基本動作
    // - 同じ user_id による再参加での追い出しと通知
    // - 未知の Room の遅延作成
    //
    // 【なぜこのテストが必要か】
    // - Registry は全接続から同時に変更される共有状態の中核
    // - 「同じ Room に同じ user_id は 1 人まで」という不変条件を保証する
    // ========================================

    const NOTICE: &str = r#"{"status":-1,"data":[]}"#;

    fn room_id(id: u32) -> RoomId {
        RoomId::new(id).unwrap()
    }

    fn create_test_registry() -> InMemoryRoomRegistry {
        InMemoryRoomRegistry::new(
            [room_id(1), room_id(2)],
            Arc::new(WebSocketMessagePusher::new()),
        )
    }

    fn session(
        id: u64,
        uid: u64,
        name: &str,
        room: u32,
    ) -> (ClientSession, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let membership = Membership {
            session_id: SessionId::new(id),
            user_id: UserId::new(uid),
            username: Username::new(name.to_string()),
            room_id: room_id(room),
        };
        (
            ClientSession::new(membership, "127.0.0.1:50000".to_string(), tx),
            rx,
        )
    }

    #[tokio::test]
    async fn test_join_and_count() {
        // テスト項目: join すると Room と全体の人数に反映される
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx1) = session(1, 1, "alice", 2);
        let (bob, _rx2) = session(2, 2, "bob", 1);

        // when (操作):
        let outcome = registry.join(alice, NOTICE).await;
        registry.join(bob, NOTICE).await;

        // then (期待する結果):
        assert!(outcome.evicted.is_empty());
        assert_eq!(registry.count(room_id(2)).await, 1);
        assert_eq!(registry.count(room_id(1)).await, 1);
        assert_eq!(registry.total_count().await, 2);
        assert!(registry.is_member(room_id(2), SessionId::new(1)).await);
    }

    #[tokio::test]
    async fn test_duplicate_user_is_evicted_and_notified() {
        // テスト項目: 同じ user_id の再参加で古いセッションに通知が届き、新しいセッションだけが残る
        // given (前提条件):
        let registry = create_test_registry();
        let (alice_a, mut rx_a) = session(1, 1, "alice", 2);
        let (alice_b, mut rx_b) = session(2, 1, "alice", 2);
        registry.join(alice_a, NOTICE).await;

        // when (操作):
        let outcome = registry.join(alice_b, NOTICE).await;

        // then (期待する結果):
        assert_eq!(outcome.evicted, vec![SessionId::new(1)]);
        assert_eq!(rx_a.recv().await, Some(NOTICE.to_string()));
        assert!(rx_b.try_recv().is_err());
        assert_eq!(registry.count(room_id(2)).await, 1);
        assert!(!registry.is_member(room_id(2), SessionId::new(1)).await);
        assert!(registry.is_member(room_id(2), SessionId::new(2)).await);
    }

    #[tokio::test]
    async fn test_same_user_in_other_room_is_not_evicted() {
        // テスト項目: 追い出しは同じ Room の中だけで行われる
        // given (前提条件):
        let registry = create_test_registry();
        let (in_room_1, mut rx1) = session(1, 1, "alice", 1);
        let (in_room_2, _rx2) = session(2, 1, "alice", 2);
        registry.join(in_room_1, NOTICE).await;

        // when (操作):
        let outcome = registry.join(in_room_2, NOTICE).await;

        // then (期待する結果):
        assert!(outcome.evicted.is_empty());
        assert!(rx1.try_recv().is_err());
        assert_eq!(registry.total_count().await, 2);
    }

    #[tokio::test]
    async fn test_leave() {
        // テスト項目: leave でメンバーが削除され、存在しない場合は None（冪等）
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx) = session(1, 1, "alice", 2);
        registry.join(alice, NOTICE).await;

        // when (操作):
        let removed = registry.leave(room_id(2), SessionId::new(1)).await;
        let again = registry.leave(room_id(2), SessionId::new(1)).await;
        let unknown_room = registry.leave(room_id(99), SessionId::new(1)).await;

        // then (期待する結果):
        assert_eq!(removed.map(|s| s.id), Some(SessionId::new(1)));
        assert!(again.is_none());
        assert!(unknown_room.is_none());
        assert_eq!(registry.count(room_id(2)).await, 0);
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        // テスト項目: broadcast は除外対象以外の全員に届き、count - 1 件になる
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = session(1, 1, "alice", 2);
        let (bob, mut bob_rx) = session(2, 2, "bob", 2);
        let (carol, mut carol_rx) = session(3, 3, "carol", 2);
        let (dave, mut dave_rx) = session(4, 4, "dave", 1);
        for s in [alice, bob, carol, dave] {
            registry.join(s, NOTICE).await;
        }

        // when (操作):
        let delivered = registry
            .broadcast(room_id(2), SessionId::new(1), "hello")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, registry.count(room_id(2)).await - 1);
        assert!(alice_rx.try_recv().is_err());
        assert_eq!(bob_rx.recv().await, Some("hello".to_string()));
        assert_eq!(carol_rx.recv().await, Some("hello".to_string()));
        assert!(dave_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_with_non_member_exclude_reaches_everyone() {
        // テスト項目: 除外対象がメンバーでなければ、Room の全員（count 件）に届く
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = session(1, 1, "alice", 2);
        let (bob, mut bob_rx) = session(2, 2, "bob", 2);
        registry.join(alice, NOTICE).await;
        registry.join(bob, NOTICE).await;

        // when (操作):
        let delivered = registry
            .broadcast(room_id(2), SessionId::new(99), "hello")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, registry.count(room_id(2)).await);
        assert_eq!(alice_rx.recv().await, Some("hello".to_string()));
        assert_eq!(bob_rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_room() {
        // テスト項目: 存在しない Room への broadcast は 0 件で、Room は作成されない
        // given (前提条件):
        let registry = create_test_registry();

        // when (操作):
        let delivered = registry
            .broadcast(room_id(42), SessionId::new(1), "hello")
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 0);
        assert_eq!(registry.room_ids().await, vec![room_id(1), room_id(2)]);
    }

    #[tokio::test]
    async fn test_room_created_lazily_on_join() {
        // テスト項目: 事前定義されていない Room は最初の join で作成される
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx) = session(1, 1, "alice", 7);

        // when (操作):
        registry.join(alice, NOTICE).await;

        // then (期待する結果):
        assert_eq!(
            registry.room_ids().await,
            vec![room_id(1), room_id(2), room_id(7)]
        );
        assert_eq!(registry.count(room_id(7)).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_joins_keep_user_unique() {
        // テスト項目: 同じ user_id の同時 join でも Room に残るのは 1 セッションだけ
        // given (前提条件):
        let registry = Arc::new(create_test_registry());
        let mut receivers = Vec::new();
        let mut handles = Vec::new();
        for id in 1..=20 {
            let (s, rx) = session(id, 1, "alice", 2);
            receivers.push(rx);
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.join(s, NOTICE).await }));
        }

        // when (操作):
        let mut evicted_total = 0;
        for handle in handles {
            evicted_total += handle.await.unwrap().evicted.len();
        }

        // then (期待する結果):
        assert_eq!(registry.count(room_id(2)).await, 1);
        assert_eq!(evicted_total, 19);
        let notified = receivers
            .iter_mut()
            .map(|rx| rx.try_recv().is_ok())
            .filter(|received| *received)
            .count();
        assert_eq!(notified, 19);
    }
}
