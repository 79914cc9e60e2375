use std::sync::Arc;

use serde::Serialize;

use crate::{
    auth::{SessionManager, UserSession},
    backend::Backend,
    model::Room,
    rooms::RoomRegistry,
    Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    NeedsRegistration { device_key: String },
    NoRooms { session: UserSession },
    RoomsLoaded { session: UserSession, rooms: Vec<Room> },
}

impl Stage {
    pub fn session(&self) -> Option<&UserSession> {
        match self {
            Stage::NeedsRegistration { .. } => None,
            Stage::NoRooms { session } | Stage::RoomsLoaded { session, .. } => Some(session),
        }
    }

    /// The room shown first once rooms are loaded.
    pub fn current_room(&self) -> Option<&Room> {
        match self {
            Stage::RoomsLoaded { rooms, .. } => rooms.first(),
            _ => None,
        }
    }
}

/// What to do when the user has no room yet.
#[derive(Debug, Clone)]
pub enum RoomChoice {
    JoinExisting { room_key: String },
    CreateNew { room_key: String, room_name: Option<String> },
}

pub struct Onboarding<B> {
    sessions: SessionManager<B>,
    rooms: RoomRegistry<B>,
}

impl<B: Backend + 'static> Onboarding<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            sessions: SessionManager::new(Arc::clone(&backend)),
            rooms: RoomRegistry::new(backend),
        }
    }

    pub fn sessions(&self) -> &SessionManager<B> {
        &self.sessions
    }

    pub fn rooms(&self) -> &RoomRegistry<B> {
        &self.rooms
    }

    /// Authenticates the device and loads its rooms.
    pub async fn start(&self, device_key: &str) -> Result<Stage, Error> {
        match self.sessions.authenticate(device_key).await {
            Ok(session) => self.refresh(session).await,
            Err(Error::NotRegistered(_)) => Ok(Stage::NeedsRegistration {
                device_key: device_key.to_owned(),
            }),
            Err(err) => Err(err),
        }
    }

    pub async fn register(&self, device_key: &str, display_name: &str) -> Result<Stage, Error> {
        let session = self.sessions.register(device_key, display_name).await?;
        self.refresh(session).await
    }

    /// Joins or creates a room, then reloads the room list.
    pub async fn choose(&self, session: UserSession, choice: RoomChoice) -> Result<Stage, Error> {
        match choice {
            RoomChoice::JoinExisting { room_key } => {
                self.rooms.join_room(&session, &room_key).await?;
            }
            RoomChoice::CreateNew { room_key, room_name } => {
                self.rooms
                    .register_room(&session, &room_key, room_name.as_deref())
                    .await?;
            }
        }
        self.refresh(session).await
    }

    pub async fn refresh(&self, session: UserSession) -> Result<Stage, Error> {
        let rooms = self.rooms.get_user_rooms(session.user()).await?;
        if rooms.is_empty() {
            Ok(Stage::NoRooms { session })
        } else {
            Ok(Stage::RoomsLoaded { session, rooms })
        }
    }
}
