//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 本人確認、永続化フック（ContentStore）への保存、送信者以外へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者自身にはメッセージが届かないことを確認
//! - 保存に失敗してもブロードキャストが継続されることを保証
//! - 追い出されたセッションからの送信が拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：uid / room_id の不一致、追い出し後の送信、保存失敗
//! - エッジケース：送信者のみが参加している場合（ブロードキャスト対象なし）

use std::sync::Arc;

use roomcast_shared::time::Clock;

use crate::{
    domain::{ContentRecord, ContentStore, Membership, RoomRegistry},
    infrastructure::dto::websocket::{SendNotice, SendRequest, Status, encode},
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Registry（接続管理の抽象化）
    registry: Arc<dyn RoomRegistry>,
    /// ContentStore（メッセージ永続化の抽象化）
    content_store: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        content_store: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            content_store,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者の参加情報（Online 時に確定したもの）
    /// * `request` - 検証済みの Send リクエスト
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - メッセージを送信できた参加者の数
    /// * `Err(SendMessageError)` - 本人確認の失敗、またはエンコード失敗
    pub async fn execute(
        &self,
        sender: &Membership,
        request: SendRequest,
    ) -> Result<usize, SendMessageError> {
        // 1. Online 時の uid / room_id と一致するか確認
        if request.user_id != sender.user_id {
            return Err(SendMessageError::UserMismatch {
                joined: sender.user_id,
                claimed: request.user_id,
            });
        }
        if request.room_id != sender.room_id {
            return Err(SendMessageError::RoomMismatch {
                joined: sender.room_id,
                claimed: request.room_id,
            });
        }

        // 2. 追い出されたセッションからの送信は受け付けない
        if !self
            .registry
            .is_member(sender.room_id, sender.session_id)
            .await
        {
            return Err(SendMessageError::NotAMember {
                room_id: sender.room_id,
                session_id: sender.session_id,
            });
        }

        // 3. 永続化（失敗してもブロードキャストは続行）
        let record = ContentRecord {
            user_id: sender.user_id,
            room_id: sender.room_id,
            content: request.content.as_str().to_string(),
            image_url: request.image_url.clone(),
        };
        if let Err(e) = self.content_store.save_content(record).await {
            tracing::warn!(
                "Failed to save message from session {} in room {}: {}",
                sender.session_id,
                sender.room_id,
                e
            );
        }

        // 4. 送信者以外にブロードキャスト
        let notice = SendNotice {
            username: sender.username.to_string(),
            uid: sender.user_id.value(),
            room_id: sender.room_id.to_string(),
            time: self.clock.now_millis(),
            avatar_id: request.avatar_id,
            content: request.content.into_string(),
            image_url: request.image_url,
        };
        let json = encode(Status::Send, &notice)?;

        let delivered = self
            .registry
            .broadcast(sender.room_id, sender.session_id, &json)
            .await;
        tracing::debug!(
            "Message from session {} delivered to {} member(s) of room {}",
            sender.session_id,
            delivered,
            sender.room_id
        );

        Ok(delivered)
    }
}
