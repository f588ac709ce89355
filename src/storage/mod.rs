//! Storage abstraction layer
//!
//! Provides a single record-level interface over the relational store.
//! Every operation is atomic and durable once it returns.

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::types::{BakedGood, Bakery, Message, RecordId};
use crate::{Error, Result};

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Record store trait
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a message stamped with the current time
    async fn create_message(&self, body: &str, username: &str) -> Result<Message>;

    /// All messages in insertion order
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn get_message(&self, id: RecordId) -> Result<Message>;

    /// Overwrite the body when one is given. `updated_at` is refreshed on
    /// every successful match, including when `body` is `None`.
    async fn update_message_body(&self, id: RecordId, body: Option<&str>) -> Result<Message>;

    async fn delete_message(&self, id: RecordId) -> Result<()>;

    /// Insert a bakery. Bakeries have no HTTP creation route; this is used
    /// for seeding.
    async fn create_bakery(&self, name: &str) -> Result<Bakery>;

    async fn list_bakeries(&self) -> Result<Vec<Bakery>>;

    async fn get_bakery(&self, id: RecordId) -> Result<Bakery>;

    /// Rename a bakery. `None` leaves it untouched and returns its current state.
    async fn update_bakery_name(&self, id: RecordId, name: Option<&str>) -> Result<Bakery>;

    /// Insert a baked good. Fails with `InvalidRequest` if the bakery does not exist.
    async fn create_baked_good(&self, name: &str, bakery_id: RecordId) -> Result<BakedGood>;

    async fn list_baked_goods(&self) -> Result<Vec<BakedGood>>;

    async fn get_baked_good(&self, id: RecordId) -> Result<BakedGood>;

    async fn delete_baked_good(&self, id: RecordId) -> Result<()>;
}

/// Create record store from config
pub async fn create_store(config: &DatabaseConfig) -> Result<Box<dyn RecordStore>> {
    let store = SqliteStore::connect(config).await?;
    Ok(Box::new(store))
}

/// Insert the named bakeries that do not exist yet.
///
/// Returns how many were created.
pub async fn seed_bakeries(store: &dyn RecordStore, names: &[String]) -> Result<usize> {
    let mut created = 0;
    for name in names {
        match store.create_bakery(name).await {
            Ok(bakery) => {
                tracing::info!(id = bakery.id, name = %bakery.name, "Seeded bakery");
                created += 1;
            }
            Err(Error::Conflict(_)) => {
                tracing::debug!(name = %name, "Bakery already present, skipping seed");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(created)
}
