mod login;
mod logout;
mod manager;
mod register;

use axum::{routing::post, Router};

use crate::AppState;

pub use manager::{SessionManager, UserSession};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/register", post(register::register))
        .route("/logout", post(logout::logout))
}
