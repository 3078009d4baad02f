//! Server state shared by every handler.

use std::{sync::Arc, time::Duration};

use crate::{
    domain::SessionIdFactory,
    usecase::{GetPresenceUseCase, JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase},
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetPresenceUseCase（オンライン人数取得のユースケース）
    pub get_presence_usecase: Arc<GetPresenceUseCase>,
    /// 接続ごとの SessionId の払い出し
    pub session_ids: SessionIdFactory,
    /// 受信待ちのタイムアウト（None なら無制限）
    pub idle_timeout: Option<Duration>,
}
