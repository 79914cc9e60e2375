use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{onboarding::Stage, session::DEVICE_KEY, AppResult, AppState, Flow};

#[derive(Deserialize)]
pub(crate) struct RegisterBody {
    pub(crate) device_key: String,
    pub(crate) display_name: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(flow): State<Flow>,
    session: Session,
    Json(RegisterBody { device_key, display_name }): Json<RegisterBody>,
) -> AppResult<Json<Stage>> {
    let stage = flow.register(&device_key, &display_name).await?;
    session.insert(DEVICE_KEY, &device_key).await?;

    Ok(Json(stage))
}
