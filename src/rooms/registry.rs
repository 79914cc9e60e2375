use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::{
    auth::UserSession,
    backend::{Backend, BackendError, Filter},
    model::{Record, Room, User, ROOM_CLASS, ROOM_KEY, ROOM_MEMBERS},
    Error,
};

pub struct RoomRegistry<B> {
    backend: Arc<B>,
    // single writer for the check-then-create sequence
    create_gate: Mutex<()>,
}

fn room_from_record(record: &Record, members: Vec<User>) -> Result<Room, Error> {
    Room::from_record(record, members)
        .ok_or_else(|| Error::Query(format!("room {} has no {ROOM_KEY}", record.id)))
}

impl<B: Backend + 'static> RoomRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            create_gate: Mutex::new(()),
        }
    }

    /// All rooms `user` belongs to. One failed member lookup fails the whole call,
    /// but only after every lookup has finished.
    pub async fn get_user_rooms(&self, user: &User) -> Result<Vec<Room>, Error> {
        let records = self
            .backend
            .query(ROOM_CLASS, &Filter::has_member(ROOM_MEMBERS, user))
            .await
            .map_err(Error::query)?;

        tracing::debug!(user_id = %user.id, rooms = records.len(), "resolving room members");

        let lookups = records.into_iter().map(|record| {
            let backend = Arc::clone(&self.backend);
            tokio::spawn(async move {
                let relation = backend.relation(&record, ROOM_MEMBERS);
                let members = backend.find_related(&relation).await?;
                Ok::<_, BackendError>((record, members))
            })
        });

        let mut rooms = Vec::new();
        for lookup in join_all(lookups).await {
            let (record, members) = lookup
                .map_err(|e| Error::Query(e.to_string()))?
                .map_err(|err| {
                    tracing::warn!(user_id = %user.id, error = %err, "member lookup failed");
                    Error::query(err)
                })?;
            rooms.push(room_from_record(&record, members)?);
        }

        Ok(rooms)
    }

    /// Creates a room under `room_key` with the session's user as its only member.
    pub async fn register_room(
        &self,
        session: &UserSession,
        room_key: &str,
        room_name: Option<&str>,
    ) -> Result<Room, Error> {
        let _gate = self.create_gate.lock().await;

        let existing = self
            .backend
            .query(ROOM_CLASS, &Filter::equal(ROOM_KEY, room_key))
            .await
            .map_err(Error::registration)?;
        if !existing.is_empty() {
            tracing::warn!(room_key, "room key already in use");
            return Err(Error::DuplicateKey(room_key.to_owned()));
        }

        let user = session.user();
        let record = match self
            .backend
            .create_record_with_member(ROOM_CLASS, Room::fields(room_key, room_name), ROOM_MEMBERS, user)
            .await
        {
            Ok(record) => record,
            Err(BackendError::Conflict(_)) => return Err(Error::DuplicateKey(room_key.to_owned())),
            Err(err) => {
                tracing::warn!(room_key, error = %err, "room creation failed");
                return Err(Error::registration(err));
            }
        };

        tracing::info!(room_id = %record.id, room_key, user_id = %user.id, "room created");
        room_from_record(&record, vec![user.clone()])
    }

    pub async fn join_room(&self, session: &UserSession, room_key: &str) -> Result<Room, Error> {
        let record = self
            .backend
            .query(ROOM_CLASS, &Filter::equal(ROOM_KEY, room_key))
            .await
            .map_err(Error::query)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::RoomNotFound(room_key.to_owned()))?;

        let user = session.user();
        self.backend
            .add_unique_member(&record, ROOM_MEMBERS, user)
            .await
            .map_err(Error::registration)?;

        let relation = self.backend.relation(&record, ROOM_MEMBERS);
        let members = self.backend.find_related(&relation).await.map_err(Error::query)?;

        tracing::info!(room_id = %record.id, room_key, user_id = %user.id, "joined room");
        room_from_record(&record, members)
    }
}
