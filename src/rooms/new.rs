use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{onboarding::{RoomChoice, Stage}, session::current_user, AppResult, AppState, Flow};

#[derive(Debug, Deserialize)]
pub(crate) struct NewRoomBody {
    room_key: String,
    room_name: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(flow): State<Flow>,
    session: Session,
    Json(NewRoomBody { room_key, room_name }): Json<NewRoomBody>,
) -> AppResult<Json<Stage>> {
    let user = current_user(&session, &flow).await?;
    let stage = flow
        .choose(user, RoomChoice::CreateNew { room_key, room_name })
        .await?;

    Ok(Json(stage))
}
