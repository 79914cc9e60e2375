use axum::{debug_handler, extract::State, Json};
use tower_sessions::Session;

use crate::{onboarding::Stage, session::current_user, AppResult, AppState, Flow};

#[debug_handler(state = AppState)]
pub(crate) async fn rooms(
    State(flow): State<Flow>,
    session: Session,
) -> AppResult<Json<Stage>> {
    let user = current_user(&session, &flow).await?;
    Ok(Json(flow.refresh(user).await?))
}
