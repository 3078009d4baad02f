//! ContentStore trait 定義（Persistence Hook）
//!
//! チャットメッセージの永続化先。履歴の保存は外部の責務であり、
//! コアは保存の失敗をログに残すだけで、ブロードキャストは続行します。

use async_trait::async_trait;

use super::{
    error::PersistenceError,
    value_object::{RoomId, UserId},
};

/// 保存するメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub content: String,
    pub image_url: Option<String>,
}

/// Content Store trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// メッセージを追記保存
    async fn save_content(&self, record: ContentRecord) -> Result<(), PersistenceError>;
}
