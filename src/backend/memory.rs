use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{Fields, NewUser, Record, User};

use super::{Backend, BackendError, Filter, RelationQuery};

#[derive(Debug)]
struct Membership {
    record: Uuid,
    field: String,
    member: Uuid,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    records: Vec<Record>,
    memberships: Vec<Membership>,
}

/// In-process backend. No uniqueness on record fields; one account per
/// device key.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn is_member(&self, record: Uuid, field: &str, member: Uuid) -> bool {
        self.memberships
            .iter()
            .any(|m| m.record == record && m.field == field && m.member == member)
    }

    fn matches(&self, record: &Record, filter: &Filter) -> bool {
        match filter {
            Filter::All => true,
            Filter::Equal { field, value } => record.fields.get(field) == Some(value),
            Filter::HasMember { relation, member } => self.is_member(record.id, relation, *member),
        }
    }
}

impl Backend for MemoryBackend {
    async fn login(&self, credential: &str) -> Result<User, BackendError> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|user| user.device_key == credential)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("no account for credential {credential}")))
    }

    async fn create_user(&self, NewUser { device_key, display_name }: NewUser) -> Result<User, BackendError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|user| user.device_key == device_key) {
            return Err(BackendError::Conflict(format!("account for {device_key} already exists")));
        }

        let user = User {
            id: Uuid::now_v7(),
            device_key,
            display_name,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn query(&self, class: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .filter(|record| record.class == class && tables.matches(record, filter))
            .cloned()
            .collect())
    }

    async fn create_record(&self, class: &str, fields: Fields) -> Result<Record, BackendError> {
        let record = Record {
            id: Uuid::now_v7(),
            class: class.to_owned(),
            fields,
        };
        self.tables.write().await.records.push(record.clone());
        Ok(record)
    }

    async fn create_record_with_member(
        &self,
        class: &str,
        fields: Fields,
        field: &str,
        member: &User,
    ) -> Result<Record, BackendError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|user| user.id == member.id) {
            return Err(BackendError::NotFound(format!("no user {}", member.id)));
        }

        let record = Record {
            id: Uuid::now_v7(),
            class: class.to_owned(),
            fields,
        };
        tables.records.push(record.clone());
        tables.memberships.push(Membership {
            record: record.id,
            field: field.to_owned(),
            member: member.id,
        });
        Ok(record)
    }

    async fn find_related(&self, relation: &RelationQuery) -> Result<Vec<User>, BackendError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| m.record == relation.record && m.field == relation.field)
            .filter_map(|m| tables.users.iter().find(|user| user.id == m.member))
            .cloned()
            .collect())
    }

    async fn add_unique_member(&self, record: &Record, field: &str, member: &User) -> Result<(), BackendError> {
        let mut tables = self.tables.write().await;
        if !tables.records.iter().any(|r| r.id == record.id) {
            return Err(BackendError::NotFound(format!("no record {}", record.id)));
        }
        if !tables.users.iter().any(|user| user.id == member.id) {
            return Err(BackendError::NotFound(format!("no user {}", member.id)));
        }

        if !tables.is_member(record.id, field, member.id) {
            tables.memberships.push(Membership {
                record: record.id,
                field: field.to_owned(),
                member: member.id,
            });
        }
        Ok(())
    }
}
