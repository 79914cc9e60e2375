use std::{str::FromStr, time::Duration};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use crate::model::{Fields, NewUser, Record, User};

use super::{Backend, BackendError, Filter, RelationQuery};

type UserRow = (String, String, String);
type RecordRow = (String, String, String);

/// Room keys are unique in storage (`records_room_key`), so a second `Room`
/// with a taken key fails with [`BackendError::Conflict`].
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db_pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn connect(database_url: &str) -> Result<SqliteBackend, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // every connection to `:memory:` opens a fresh database
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(16)
        };

        let db_pool = pool_options.connect_with(options).await?;
        sqlx::migrate!().run(&db_pool).await?;

        Ok(SqliteBackend { db_pool })
    }

    pub fn db_pool(&self) -> &SqlitePool {
        &self.db_pool
    }
}

fn parse_id(id: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(id).map_err(|e| BackendError::Unavailable(format!("corrupt id {id}: {e}")))
}

fn user_from_row((id, device_key, display_name): UserRow) -> Result<User, BackendError> {
    Ok(User {
        id: parse_id(&id)?,
        device_key,
        display_name,
    })
}

fn record_from_row((id, class, fields): RecordRow) -> Result<Record, BackendError> {
    let fields: Fields = serde_json::from_str(&fields)
        .map_err(|e| BackendError::Unavailable(format!("corrupt fields on {id}: {e}")))?;
    Ok(Record {
        id: parse_id(&id)?,
        class,
        fields,
    })
}

impl Backend for SqliteBackend {
    async fn login(&self, credential: &str) -> Result<User, BackendError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id,device_key,display_name FROM users WHERE device_key=?")
                .bind(credential)
                .fetch_optional(&self.db_pool)
                .await?;

        match row {
            Some(row) => user_from_row(row),
            None => Err(BackendError::NotFound(format!("no account for credential {credential}"))),
        }
    }

    async fn create_user(&self, NewUser { device_key, display_name }: NewUser) -> Result<User, BackendError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO users (id,device_key,display_name) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(&device_key)
            .bind(&display_name)
            .execute(&self.db_pool)
            .await?;

        Ok(User {
            id,
            device_key,
            display_name,
        })
    }

    async fn query(&self, class: &str, filter: &Filter) -> Result<Vec<Record>, BackendError> {
        let rows: Vec<RecordRow> = match filter {
            Filter::All => {
                sqlx::query_as("SELECT id,class,fields FROM records WHERE class=? ORDER BY rowid")
                    .bind(class)
                    .fetch_all(&self.db_pool)
                    .await?
            }
            Filter::Equal { field, value } => {
                sqlx::query_as(
                    "SELECT id,class,fields FROM records \
                     WHERE class=? AND json_extract(fields, ?) = json_extract(?, '$') \
                     ORDER BY rowid",
                )
                .bind(class)
                .bind(format!("$.{field}"))
                .bind(value.to_string())
                .fetch_all(&self.db_pool)
                .await?
            }
            Filter::HasMember { relation, member } => {
                sqlx::query_as(
                    "SELECT r.id,r.class,r.fields FROM records r \
                     JOIN memberships m ON m.record_id = r.id \
                     WHERE r.class=? AND m.field=? AND m.member_id=? \
                     ORDER BY r.rowid",
                )
                .bind(class)
                .bind(relation)
                .bind(member.to_string())
                .fetch_all(&self.db_pool)
                .await?
            }
        };

        rows.into_iter().map(record_from_row).collect()
    }

    async fn create_record(&self, class: &str, fields: Fields) -> Result<Record, BackendError> {
        let id = Uuid::now_v7();
        let encoded = serde_json::to_string(&fields)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        sqlx::query("INSERT INTO records (id,class,fields) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(class)
            .bind(encoded)
            .execute(&self.db_pool)
            .await?;

        Ok(Record {
            id,
            class: class.to_owned(),
            fields,
        })
    }

    async fn create_record_with_member(
        &self,
        class: &str,
        fields: Fields,
        field: &str,
        member: &User,
    ) -> Result<Record, BackendError> {
        let id = Uuid::now_v7();
        let encoded = serde_json::to_string(&fields)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        // dropped without commit on any error, which rolls back the record
        let mut tx = self.db_pool.begin().await?;

        sqlx::query("INSERT INTO records (id,class,fields) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(class)
            .bind(encoded)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO memberships (record_id,field,member_id) VALUES (?,?,?)")
            .bind(id.to_string())
            .bind(field)
            .bind(member.id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Record {
            id,
            class: class.to_owned(),
            fields,
        })
    }

    async fn find_related(&self, relation: &RelationQuery) -> Result<Vec<User>, BackendError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT u.id,u.device_key,u.display_name FROM memberships m \
             JOIN users u ON u.id = m.member_id \
             WHERE m.record_id=? AND m.field=? \
             ORDER BY m.rowid",
        )
        .bind(relation.record.to_string())
        .bind(&relation.field)
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter().map(user_from_row).collect()
    }

    async fn add_unique_member(&self, record: &Record, field: &str, member: &User) -> Result<(), BackendError> {
        sqlx::query(
            "INSERT INTO memberships (record_id,field,member_id) VALUES (?,?,?) \
             ON CONFLICT DO NOTHING",
        )
        .bind(record.id.to_string())
        .bind(field)
        .bind(member.id.to_string())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }
}
