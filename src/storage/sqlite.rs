//! SQLite record store

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::types::{timestamp_now, BakedGood, Bakery, Message, RecordId, RecordKind};
use crate::{Error, Result};

use super::RecordStore;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Record store backed by a SQLite connection pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database described by `config` and
    /// apply pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(url = %config.url, "Connected to SQLite database");
        Self::from_pool(pool).await
    }

    /// Private in-memory database. The pool holds a single connection that
    /// never expires, since closing it would drop every table.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Map unique constraint failures to `Conflict`, everything else to `Database`
fn map_write_error(err: sqlx::Error, conflict: impl FnOnce() -> Error) -> Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return conflict();
        }
    }
    Error::from(err)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn create_message(&self, body: &str, username: &str) -> Result<Message> {
        let now = timestamp_now();
        let message = sqlx::query_as(
            "INSERT INTO message (body, username, created_at, updated_at) VALUES (?, ?, ?, ?) \
             RETURNING id, body, username, created_at, updated_at",
        )
        .bind(body)
        .bind(username)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let messages = sqlx::query_as(
            "SELECT id, body, username, created_at, updated_at FROM message ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn get_message(&self, id: RecordId) -> Result<Message> {
        sqlx::query_as("SELECT id, body, username, created_at, updated_at FROM message WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(RecordKind::Message, id))
    }

    async fn update_message_body(&self, id: RecordId, body: Option<&str>) -> Result<Message> {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading so no other writer can commit
        // between the read and the update
        let locked = sqlx::query("UPDATE message SET updated_at = updated_at WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(Error::not_found(RecordKind::Message, id));
        }

        let current: Message = sqlx::query_as(
            "SELECT id, body, username, created_at, updated_at FROM message WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::not_found(RecordKind::Message, id))?;

        let updated_at = current.next_update_time();
        let body = body.unwrap_or(current.body.as_str());

        let message = sqlx::query_as(
            "UPDATE message SET body = ?, updated_at = ? WHERE id = ? \
             RETURNING id, body, username, created_at, updated_at",
        )
        .bind(body)
        .bind(updated_at)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn delete_message(&self, id: RecordId) -> Result<()> {
        let result = sqlx::query("DELETE FROM message WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(RecordKind::Message, id));
        }
        Ok(())
    }

    async fn create_bakery(&self, name: &str) -> Result<Bakery> {
        sqlx::query_as("INSERT INTO bakery (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, || {
                    Error::conflict(format!("Bakery name '{}' is already taken", name))
                })
            })
    }

    async fn list_bakeries(&self) -> Result<Vec<Bakery>> {
        let bakeries = sqlx::query_as("SELECT id, name FROM bakery ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(bakeries)
    }

    async fn get_bakery(&self, id: RecordId) -> Result<Bakery> {
        sqlx::query_as("SELECT id, name FROM bakery WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(RecordKind::Bakery, id))
    }

    async fn update_bakery_name(&self, id: RecordId, name: Option<&str>) -> Result<Bakery> {
        let Some(name) = name else {
            return self.get_bakery(id).await;
        };

        let bakery: Option<Bakery> =
            sqlx::query_as("UPDATE bakery SET name = ? WHERE id = ? RETURNING id, name")
                .bind(name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    map_write_error(e, || {
                        Error::conflict(format!("Bakery name '{}' is already taken", name))
                    })
                })?;

        bakery.ok_or_else(|| Error::not_found(RecordKind::Bakery, id))
    }

    async fn create_baked_good(&self, name: &str, bakery_id: RecordId) -> Result<BakedGood> {
        sqlx::query_as(
            "INSERT INTO baked_good (name, bakery_id) VALUES (?, ?) RETURNING id, name, bakery_id",
        )
        .bind(name)
        .bind(bakery_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                return Error::invalid_request(format!("Bakery {} does not exist", bakery_id));
            }
            map_write_error(e, || {
                Error::conflict(format!("Baked good name '{}' is already taken", name))
            })
        })
    }

    async fn list_baked_goods(&self) -> Result<Vec<BakedGood>> {
        let baked_goods = sqlx::query_as("SELECT id, name, bakery_id FROM baked_good ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(baked_goods)
    }

    async fn get_baked_good(&self, id: RecordId) -> Result<BakedGood> {
        sqlx::query_as("SELECT id, name, bakery_id FROM baked_good WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(RecordKind::BakedGood, id))
    }

    async fn delete_baked_good(&self, id: RecordId) -> Result<()> {
        let result = sqlx::query("DELETE FROM baked_good WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(RecordKind::BakedGood, id));
        }
        Ok(())
    }
}
