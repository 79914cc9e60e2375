use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::{session::NotLoggedIn, Error};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

fn status_of(err: &Error) -> StatusCode {
    match err {
        Error::NotRegistered(_) => StatusCode::UNAUTHORIZED,
        Error::DuplicateKey(_) => StatusCode::CONFLICT,
        Error::RoomNotFound(_) => StatusCode::NOT_FOUND,
        Error::Transient(_) | Error::Query(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Registration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, retryable) = match self.0.downcast_ref::<Error>() {
            Some(err) => (status_of(err), err.kind(), err.is_retryable()),
            None if self.0.is::<NotLoggedIn>() => (StatusCode::UNAUTHORIZED, "not_logged_in", false),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "internal", false),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        }

        (
            status,
            Json(json!({
                "error": kind,
                "message": self.0.to_string(),
                "retryable": retryable,
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
