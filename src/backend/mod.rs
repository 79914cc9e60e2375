mod memory;
mod sqlite;

#[cfg(test)]
pub(crate) mod faulty;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Fields, NewUser, Record, User};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A write collided with a uniqueness constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                BackendError::Conflict(db_err.message().to_owned())
            }
            other => BackendError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Equal { field: String, value: Value },
    HasMember { relation: String, member: Uuid },
}

impl Filter {
    pub fn equal(field: &str, value: impl Into<Value>) -> Self {
        Filter::Equal {
            field: field.to_owned(),
            value: value.into(),
        }
    }

    pub fn has_member(relation: &str, member: &User) -> Self {
        Filter::HasMember {
            relation: relation.to_owned(),
            member: member.id,
        }
    }
}

/// Sub-query handle: the users linked to `record` through `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationQuery {
    pub record: Uuid,
    pub field: String,
}

pub trait Backend: Send + Sync {
    /// [`BackendError::NotFound`] when no account uses the credential.
    fn login(&self, credential: &str)
    -> impl Future<Output = Result<User, BackendError>> + Send;

    fn create_user(&self, user: NewUser)
    -> impl Future<Output = Result<User, BackendError>> + Send;

    /// Records of `class` matching `filter`, in insertion order.
    fn query(
        &self,
        class: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Record>, BackendError>> + Send;

    fn create_record(
        &self,
        class: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<Record, BackendError>> + Send;

    /// Writes the record and its first relation member together; on failure
    /// neither is stored.
    fn create_record_with_member(
        &self,
        class: &str,
        fields: Fields,
        field: &str,
        member: &User,
    ) -> impl Future<Output = Result<Record, BackendError>> + Send;

    fn relation(&self, record: &Record, field: &str) -> RelationQuery {
        RelationQuery {
            record: record.id,
            field: field.to_owned(),
        }
    }

    fn find_related(
        &self,
        relation: &RelationQuery,
    ) -> impl Future<Output = Result<Vec<User>, BackendError>> + Send;

    /// Adds `member` to the relation unless it is already there.
    fn add_unique_member(
        &self,
        record: &Record,
        field: &str,
        member: &User,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}
