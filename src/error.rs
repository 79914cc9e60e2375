use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("device is not registered: {0}")]
    NotRegistered(String),

    #[error("backend unavailable: {0}")]
    Transient(String),

    #[error("room key '{0}' is already in use")]
    DuplicateKey(String),

    #[error("no room uses key '{0}'")]
    RoomNotFound(String),

    #[error("lookup failed: {0}")]
    Query(String),

    #[error("registration failed: {0}")]
    Registration(String),
}

impl Error {
    /// Whether repeating the identical call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transient(_) | Error::Query(_) | Error::Registration(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotRegistered(_) => "not_registered",
            Error::Transient(_) => "transient",
            Error::DuplicateKey(_) => "duplicate_key",
            Error::RoomNotFound(_) => "room_not_found",
            Error::Query(_) => "query",
            Error::Registration(_) => "registration",
        }
    }

    pub(crate) fn query(err: BackendError) -> Self {
        Error::Query(err.to_string())
    }

    pub(crate) fn registration(err: BackendError) -> Self {
        Error::Registration(err.to_string())
    }
}
