//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 各セッションの `PusherChannel` へのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成と書き込みは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装はセッションが持つ `UnboundedSender` に積むだけなので、
//! Room のロック中に呼ばれてもブロックしません。

use crate::domain::{ClientSession, MessagePushError, MessagePusher};

/// WebSocket を使った MessagePusher 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketMessagePusher;

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self
    }
}

impl MessagePusher for WebSocketMessagePusher {
    fn push_to(&self, target: &ClientSession, content: &str) -> Result<(), MessagePushError> {
        target
            .channel
            .send(content.to_string())
            .map_err(|_| MessagePushError::ChannelClosed(target.id))?;
        tracing::debug!(
            "Pushed message to session {} ('{}')",
            target.id,
            target.username
        );
        Ok(())
    }

    fn broadcast(
        &self,
        targets: &mut dyn Iterator<Item = &ClientSession>,
        content: &str,
    ) -> usize {
        let mut delivered = 0;

        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match self.push_to(target, content) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    "Failed to push message to '{}' ({}): {}",
                    target.username,
                    target.remote_address,
                    e
                ),
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Membership, RoomId, SessionId, UserId, Username};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のセッションへの送信
    // - broadcast: 複数セッションへの送信と、送信できた数
    // - 送信失敗（受信側が閉じている）の扱い
    //
    // 【なぜこのテストが必要か】
    // - 1 つの宛先の失敗が他の宛先への配送を止めないことを保証する
    // ========================================

    fn session(id: u64, name: &str) -> (ClientSession, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let membership = Membership {
            session_id: SessionId::new(id),
            user_id: UserId::new(id),
            username: Username::new(name.to_string()),
            room_id: RoomId::new(1).unwrap(),
        };
        (ClientSession::new(membership, "127.0.0.1:9".to_string(), tx), rx)
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のセッションにメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, mut rx) = session(1, "alice");

        // when (操作):
        let result = pusher.push_to(&alice, "Hello");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel() {
        // テスト項目: 受信側が閉じたセッションへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, rx) = session(1, "alice");
        drop(rx);

        // when (操作):
        let result = pusher.push_to(&alice, "Hello");

        // then (期待する結果):
        assert_eq!(result, Err(MessagePushError::ChannelClosed(SessionId::new(1))));
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 一部の宛先が閉じていても残りの宛先には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (alice, mut alice_rx) = session(1, "alice");
        let (bob, bob_rx) = session(2, "bob");
        let (carol, mut carol_rx) = session(3, "carol");
        drop(bob_rx);
        let targets = [alice, bob, carol];

        // when (操作):
        let delivered = pusher.broadcast(&mut targets.iter(), "Broadcast message");

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(alice_rx.recv().await, Some("Broadcast message".to_string()));
        assert_eq!(carol_rx.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_empty_targets() {
        // テスト項目: 空のターゲットでもエラーにならない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let delivered = pusher.broadcast(&mut std::iter::empty::<&ClientSession>(), "Message");

        // then (期待する結果):
        assert_eq!(delivered, 0);
    }
}
