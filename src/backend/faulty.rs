use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use uuid::Uuid;

use crate::model::{Fields, NewUser, Record, User};

use super::{Backend, BackendError, Filter, MemoryBackend, RelationQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Login,
    Query,
    CreateRecord,
    AddMember,
    /// Member lookup of this one record.
    Related(Uuid),
}

/// Memory backend that fails each armed call once.
#[derive(Default)]
pub(crate) struct FaultyBackend {
    inner: MemoryBackend,
    armed: Mutex<Vec<Fault>>,
    pub(crate) finished_lookups: AtomicUsize,
}

impl FaultyBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn arm(&self, fault: Fault) {
        if let Ok(mut armed) = self.armed.lock() {
            armed.push(fault);
        }
    }

    fn trip(&self, fault: Fault) -> Result<(), BackendError> {
        let Ok(mut armed) = self.armed.lock() else {
            return Ok(());
        };
        match armed.iter().position(|f| *f == fault) {
            Some(i) => {
                armed.remove(i);
                Err(BackendError::Unavailable(format!("{fault:?} failed")))
            }
            None => Ok(()),
        }
    }
}

impl Backend for FaultyBackend {
    async fn login(&self, credential: &str) -> Result<User, BackendError> {
        self.trip(Fault::Login)?;
        self.inner.login(credential).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, BackendError> {
        self.inner.create_user(user).await
    }

    async fn query(&self, class: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        self.trip(Fault::Query)?;
        self.inner.query(class, filter).await
    }

    async fn create_record(&self, class: &str, fields: Fields) -> Result<Record, BackendError> {
        self.trip(Fault::CreateRecord)?;
        self.inner.create_record(class, fields).await
    }

    async fn create_record_with_member(
        &self,
        class: &str,
        fields: Fields,
        field: &str,
        member: &User,
    ) -> Result<Record, BackendError> {
        self.trip(Fault::CreateRecord)?;
        self.inner.create_record_with_member(class, fields, field, member).await
    }

    async fn find_related(&self, relation: &RelationQuery) -> Result<Vec<User>, BackendError> {
        let result = match self.trip(Fault::Related(relation.record)) {
            Ok(()) => self.inner.find_related(relation).await,
            Err(err) => Err(err),
        };
        self.finished_lookups.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn add_unique_member(&self, record: &Record, field: &str, member: &User) -> Result<(), BackendError> {
        self.trip(Fault::AddMember)?;
        self.inner.add_unique_member(record, field, member).await
    }
}
