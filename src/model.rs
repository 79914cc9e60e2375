use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

pub const ROOM_CLASS: &str = "Room";
pub const ROOM_KEY: &str = "roomKey";
pub const ROOM_NAME: &str = "roomName";
// relation field linking a room to its members
pub const ROOM_MEMBERS: &str = "users";

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    // login credential, never sent to other members
    #[serde(skip_serializing)]
    pub device_key: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub device_key: String,
    pub display_name: String,
}

/// A generic object as stored by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub class: String,
    pub fields: Fields,
}

impl Record {
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: Uuid,
    pub room_key: String,
    pub room_name: Option<String>,
    pub members: Vec<User>,
}

impl Room {
    /// Builds a room from a `Room` record; `None` when the key field is missing.
    pub(crate) fn from_record(record: &Record, members: Vec<User>) -> Option<Room> {
        Some(Room {
            id: record.id,
            room_key: record.get_str(ROOM_KEY)?.to_owned(),
            room_name: record.get_str(ROOM_NAME).map(str::to_owned),
            members,
        })
    }

    pub(crate) fn fields(room_key: &str, room_name: Option<&str>) -> Fields {
        let mut fields = Fields::new();
        fields.insert(ROOM_KEY.to_owned(), Value::from(room_key));
        if let Some(room_name) = room_name {
            fields.insert(ROOM_NAME.to_owned(), Value::from(room_name));
        }
        fields
    }

    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|member| member.id == user_id)
    }
}
