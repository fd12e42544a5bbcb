//! Persistence of journal state.
//!
//! State lives in three independent slots of a key-value store:
//! - the account profile
//! - the in-progress idea draft
//! - the journal rows
//!
//! Each slot holds a JSON document that is overwritten in full on every
//! save. A slot that is missing or unreadable loads as its default.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
#[cfg(test)]
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Storage backend for raw slot contents.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Named state slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Account,
    Draft,
    Journal,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Account => "itp_account",
            Slot::Draft => "itp_idea",
            Slot::Journal => "itp_rows",
        }
    }
}

/// Typed JSON access to the slots of a key-value store.
pub struct StateStore<S> {
    backend: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Load a slot, falling back to `default` when it is missing, cannot
    /// be read, or does not parse.
    pub async fn load_or<T, F>(&self, slot: Slot, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let raw = match self.backend.get(slot.key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(slot = slot.key(), "Slot empty, using default");
                return default();
            }
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Failed to read slot, using default");
                return default();
            }
        };

        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(Some(value)) => value,
            Ok(None) => default(),
            Err(e) => {
                warn!(slot = slot.key(), error = %e, "Stored slot is malformed, using default");
                default()
            }
        }
    }

    /// Overwrite a slot with the JSON form of `value`.
    pub async fn save<T: Serialize>(&self, slot: Slot, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize slot {}", slot.key()))?;
        self.backend.put(slot.key(), &json).await?;
        debug!(slot = slot.key(), bytes = json.len(), "Saved slot");
        Ok(())
    }

    #[cfg(test)]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    #[cfg(test)]
    pub fn into_backend(self) -> S {
        self.backend
    }
}

/// SQLite-backed key-value store.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and create if needed) the database at `database_url`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Private in-memory database on a single long-lived connection.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read key {}", key))?;

        Ok(row.map(|(v,)| v))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write key {}", key))?;

        Ok(())
    }
}

/// In-process key-value store.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::models::AccountProfile;

    #[tokio::test]
    async fn test_database_put_get() {
        let db = Database::in_memory().await.unwrap();

        assert_eq!(db.get("missing").await.unwrap(), None);

        db.put("k", "one").await.unwrap();
        db.put("k", "two").await.unwrap();
        assert_eq!(db.get("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_slot_round_trip_through_sqlite() {
        let store = StateStore::new(Database::in_memory().await.unwrap());
        let account = AccountProfile {
            balance: dec!(2500),
            ..Default::default()
        };

        store.save(Slot::Account, &account).await.unwrap();
        let loaded: AccountProfile = store.load_or(Slot::Account, AccountProfile::default).await;
        assert_eq!(loaded, account);
    }

    #[tokio::test]
    async fn test_missing_slot_uses_default() {
        let store = StateStore::new(MemoryStore::new());
        let loaded: AccountProfile = store.load_or(Slot::Account, AccountProfile::default).await;
        assert_eq!(loaded, AccountProfile::default());
    }

    #[tokio::test]
    async fn test_malformed_slot_uses_default() {
        let store = StateStore::new(MemoryStore::new());

        for raw in ["{not json", "null", r#"{"balance":"lots"}"#, "[1,2,3]"] {
            store.backend().put(Slot::Account.key(), raw).await.unwrap();
            let loaded: AccountProfile =
                store.load_or(Slot::Account, AccountProfile::default).await;
            assert_eq!(loaded, AccountProfile::default(), "raw = {}", raw);
        }
    }

    #[tokio::test]
    async fn test_blank_account_field_keeps_saved_profile() {
        let store = StateStore::new(MemoryStore::new());
        let raw = r#"{"balance":"","riskPercent":"2","pair":"EURUSD","tickValue":"10","pointSize":"0.0001"}"#;
        store.backend().put(Slot::Account.key(), raw).await.unwrap();

        let loaded: AccountProfile = store.load_or(Slot::Account, AccountProfile::default).await;
        assert_eq!(loaded.pair, "EURUSD");
        assert_eq!(loaded.balance, dec!(0));
        assert_eq!(loaded.risk_percent, dec!(2));
        assert_eq!(loaded.tick_value, dec!(10));
        assert_eq!(loaded.point_size, dec!(0.0001));
        assert_eq!(loaded.risk_money(), dec!(0));
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let store = StateStore::new(MemoryStore::new());
        store.save(Slot::Journal, &Vec::<String>::new()).await.unwrap();

        assert!(store.backend().get("itp_rows").await.unwrap().is_some());
        assert!(store.backend().get("itp_account").await.unwrap().is_none());
        assert!(store.backend().get("itp_idea").await.unwrap().is_none());
    }
}
