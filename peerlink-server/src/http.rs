use crate::signaling::SignalingRouter;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RoomInfo {
    pub room_id: String,
    pub exists: bool,
    pub participant_count: usize,
}

/// Lookup-or-create a room by identifier, using the same normalization
/// as a join. Creation on first query is deliberate: the "create call"
/// page probes the room before anyone connects.
pub async fn room_lookup(
    Path(raw): Path<String>,
    State(router): State<SignalingRouter>,
) -> impl IntoResponse {
    let registry = router.registry();
    match registry.get_or_create(&raw) {
        Some(room) => Json(RoomInfo {
            room_id: room.to_string(),
            exists: true,
            participant_count: registry.participant_count(&room),
        })
        .into_response(),
        None => (StatusCode::BAD_REQUEST, "blank room identifier").into_response(),
    }
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
