use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{onboarding::Stage, session::DEVICE_KEY, AppResult, AppState, Flow};

#[derive(Deserialize)]
pub(crate) struct LoginBody {
    pub(crate) device_key: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(flow): State<Flow>,
    session: Session,
    Json(LoginBody { device_key }): Json<LoginBody>,
) -> AppResult<Json<Stage>> {
    let stage = flow.start(&device_key).await?;

    if stage.session().is_some() {
        session.insert(DEVICE_KEY, &device_key).await?;
    }

    Ok(Json(stage))
}
