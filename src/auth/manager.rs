use std::sync::Arc;

use serde::Serialize;

use crate::{
    backend::{Backend, BackendError},
    model::{NewUser, User},
    Error,
};

/// The authenticated identity, passed explicitly to every room operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub user: User,
}

impl UserSession {
    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Resolves device keys to accounts. Keeps no state between calls.
pub struct SessionManager<B> {
    backend: Arc<B>,
}

impl<B> Clone for SessionManager<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: Backend> SessionManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// An unknown key is [`Error::NotRegistered`], any other failure [`Error::Transient`].
    pub async fn authenticate(&self, device_key: &str) -> Result<UserSession, Error> {
        match self.backend.login(device_key).await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "device authenticated");
                Ok(UserSession { user })
            }
            Err(BackendError::NotFound(message)) => Err(Error::NotRegistered(message)),
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                Err(Error::Transient(err.to_string()))
            }
        }
    }

    /// Creates the account for `device_key`. The name is stored as given.
    pub async fn register(&self, device_key: &str, display_name: &str) -> Result<UserSession, Error> {
        let user = self
            .backend
            .create_user(NewUser {
                device_key: device_key.to_owned(),
                display_name: display_name.to_owned(),
            })
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "registration failed");
                Error::registration(err)
            })?;

        tracing::info!(user_id = %user.id, display_name = %user.display_name, "registered device");
        Ok(UserSession { user })
    }
}
