use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{onboarding::{RoomChoice, Stage}, session::current_user, AppResult, AppState, Flow};

#[derive(Debug, Deserialize)]
pub(crate) struct JoinRoomBody {
    room_key: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn join_room(
    State(flow): State<Flow>,
    session: Session,
    Json(JoinRoomBody { room_key }): Json<JoinRoomBody>,
) -> AppResult<Json<Stage>> {
    let user = current_user(&session, &flow).await?;
    let stage = flow
        .choose(user, RoomChoice::JoinExisting { room_key })
        .await?;

    Ok(Json(stage))
}
