pub mod auth;
pub mod backend;
pub mod config;
pub mod model;
pub mod onboarding;
pub mod rooms;
pub mod session;

mod appresult;
mod error;

use std::sync::Arc;

use axum::{extract::FromRef, Router};

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use error::Error;

use backend::SqliteBackend;
use onboarding::Onboarding;

pub type Flow = Arc<Onboarding<SqliteBackend>>;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub flow: Flow,
}

impl AppState {
    pub fn new(backend: SqliteBackend) -> AppState {
        AppState {
            flow: Arc::new(Onboarding::new(Arc::new(backend))),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .nest("/r", rooms::router())
        .with_state(app_state)
}
