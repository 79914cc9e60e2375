mod join;
mod list;
mod new;
mod registry;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use registry::RoomRegistry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::rooms))
        .route("/new", post(new::new_room))
        .route("/join", post(join::join_room))
}
