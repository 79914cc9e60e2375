use thiserror::Error;
use tower_sessions::Session;

use crate::{auth::UserSession, AppResult, Flow};

pub const DEVICE_KEY: &str = "device_key";

#[derive(Debug, Error)]
#[error("no device is logged in on this session")]
pub struct NotLoggedIn;

/// Re-authenticates the device stored in the cookie session.
pub(crate) async fn current_user(session: &Session, flow: &Flow) -> AppResult<UserSession> {
    let Some(device_key) = session.get::<String>(DEVICE_KEY).await? else {
        return Err(NotLoggedIn.into());
    };

    Ok(flow.sessions().authenticate(&device_key).await?)
}
