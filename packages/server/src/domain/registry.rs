//! RoomRegistry trait 定義
//!
//! どの接続がどの Room に属しているかを管理するインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 排他制御
//!
//! 同じ Room に対する join（追い出しを含む）/ leave / broadcast は直列化されます。
//! broadcast が変更途中のメンバーリストを観測することはありません。

use async_trait::async_trait;

use super::{
    entity::ClientSession,
    value_object::{RoomId, SessionId},
};

/// join の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    /// 同じ user_id を持っていたため追い出されたセッション
    pub evicted: Vec<SessionId>,
}

/// Room Registry trait
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// セッションを Room に追加
    ///
    /// 同じ user_id の別セッションが既に参加している場合、そのセッションに
    /// `eviction_notice` を送ってから削除し、その後で新しいセッションを追加する。
    async fn join(&self, session: ClientSession, eviction_notice: &str) -> JoinOutcome;

    /// セッションを Room から削除（存在しなければ None）
    async fn leave(&self, room_id: RoomId, session_id: SessionId) -> Option<ClientSession>;

    /// `exclude` 以外の全メンバーにメッセージを送信し、送信できた数を返す
    async fn broadcast(&self, room_id: RoomId, exclude: SessionId, content: &str) -> usize;

    /// セッションが Room のメンバーかどうか
    async fn is_member(&self, room_id: RoomId, session_id: SessionId) -> bool;

    /// Room の参加人数
    async fn count(&self, room_id: RoomId) -> usize;

    /// 全 Room の参加人数の合計
    async fn total_count(&self) -> usize;

    /// 既知の Room ID 一覧（昇順）
    async fn room_ids(&self) -> Vec<RoomId>;
}
