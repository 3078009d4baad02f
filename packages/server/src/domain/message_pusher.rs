//! MessagePusher trait 定義
//!
//! 接続中のクライアントへフレームを届けるためのインターフェース（Broadcast Engine）。
//! 送信は各接続の `PusherChannel` への非同期でない push なので、
//! Room のロックを保持したまま呼び出してもソケット I/O を待つことはありません。

use super::{entity::ClientSession, error::MessagePushError};

/// MessagePusher trait
pub trait MessagePusher: Send + Sync {
    /// 1 つのセッションにメッセージを送信
    fn push_to(&self, target: &ClientSession, content: &str) -> Result<(), MessagePushError>;

    /// 複数のセッションにメッセージを送信
    ///
    /// 一部の送信失敗は他の宛先への配送を止めない（ベストエフォート）。
    ///
    /// # Returns
    ///
    /// 送信に成功した宛先の数
    fn broadcast(&self, targets: &mut dyn Iterator<Item = &ClientSession>, content: &str)
    -> usize;
}
