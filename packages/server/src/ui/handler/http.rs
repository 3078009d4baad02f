//! HTTP API endpoint handlers.

use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{OnlineCountDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Live connection count and room member total
pub async fn get_online(State(state): State<Arc<AppState>>) -> Json<OnlineCountDto> {
    Json(OnlineCountDto {
        count: state.get_presence_usecase.online_user_count(),
        in_rooms: state.get_presence_usecase.room_member_count().await,
    })
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_presence_usecase.rooms().await;

    // Domain Model から DTO への変換
    let room_summaries = rooms
        .into_iter()
        .map(|(room_id, num)| RoomSummaryDto {
            id: room_id.value(),
            num,
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummaryDto>, StatusCode> {
    let room_id = match RoomId::from_str(&room_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid room id '{}': {}", room_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let num = state
        .get_presence_usecase
        .online_room_user_count(room_id)
        .await;
    Ok(Json(RoomSummaryDto {
        id: room_id.value(),
        num,
    }))
}
