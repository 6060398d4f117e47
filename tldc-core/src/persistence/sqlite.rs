use crate::persistence::store::{ModelEntry, Store, SyncRecord};
use crate::settings::config::{DEFAULT_MODEL_NAME, DEFAULT_MODEL_PROVIDER, DEFAULT_MODEL_SETTINGS};
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS config (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS models (
        name TEXT PRIMARY KEY,
        provider TEXT NOT NULL,
        settings TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS contexts (
        context TEXT PRIMARY KEY,
        response_cursor TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        context TEXT NOT NULL,
        message TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_history_context ON history(context, id)",
    "CREATE TABLE IF NOT EXISTS sync_status (
        path TEXT PRIMARY KEY,
        checksum TEXT NOT NULL,
        synced INTEGER NOT NULL
    )",
];

/// SQLite backed [`Store`]. Every method is a single autocommitted statement.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database {path:?}"))?;

        Self::init(pool).await
    }

    /// A private database that lives as long as the store.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A single connection that never expires; an in-memory database is
        // dropped together with its last connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .context("Failed to initialize database schema")?;
        }

        let store = Self { pool };
        store
            .add_model(&ModelEntry::new(
                DEFAULT_MODEL_NAME,
                DEFAULT_MODEL_PROVIDER,
                DEFAULT_MODEL_SETTINGS,
            ))
            .await?;
        Ok(store)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    async fn config_value(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT value FROM config WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read config value {key}"))
    }

    async fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO config (key, value) VALUES (?1, ?2)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to write config value {key}"))?;
        Ok(())
    }

    async fn models(&self) -> Result<Vec<ModelEntry>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, provider, settings FROM models ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list models")?;

        Ok(rows
            .into_iter()
            .map(|(name, provider, settings)| ModelEntry {
                name,
                provider,
                settings,
            })
            .collect())
    }

    async fn model(&self, name: &str) -> Result<Option<ModelEntry>> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT name, provider, settings FROM models WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to read model {name}"))?;

        Ok(row.map(|(name, provider, settings)| ModelEntry {
            name,
            provider,
            settings,
        }))
    }

    async fn add_model(&self, entry: &ModelEntry) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO models (name, provider, settings) VALUES (?1, ?2, ?3)")
            .bind(&entry.name)
            .bind(&entry.provider)
            .bind(&entry.settings)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to save model {}", entry.name))?;
        Ok(())
    }

    async fn delete_model(&self, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM models WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete model {name}"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn history(&self, context: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT message FROM history WHERE context = ?1 ORDER BY id",
        )
        .bind(context)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load history for {context}"))
    }

    async fn append_history(&self, context: &str, message: &str) -> Result<()> {
        sqlx::query("INSERT INTO history (context, message) VALUES (?1, ?2)")
            .bind(context)
            .bind(message)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to append history for {context}"))?;
        Ok(())
    }

    async fn clear_history(&self, context: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM history WHERE context = ?1")
            .bind(context)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to clear history for {context}"))?;
        debug!(context, removed = result.rows_affected(), "Cleared history");
        Ok(())
    }

    async fn response_cursor(&self, context: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT response_cursor FROM contexts WHERE context = ?1",
        )
        .bind(context)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to read response cursor for {context}"))
    }

    async fn set_response_cursor(&self, context: &str, cursor: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO contexts (context, response_cursor) VALUES (?1, ?2)")
            .bind(context)
            .bind(cursor)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to save response cursor for {context}"))?;
        Ok(())
    }

    async fn clear_response_cursor(&self, context: &str) -> Result<()> {
        sqlx::query("DELETE FROM contexts WHERE context = ?1")
            .bind(context)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to clear response cursor for {context}"))?;
        Ok(())
    }

    async fn sync_record(&self, path: &str) -> Result<Option<SyncRecord>> {
        let row = sqlx::query_as::<_, (String, bool)>(
            "SELECT checksum, synced FROM sync_status WHERE path = ?1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to read sync status for {path}"))?;

        Ok(row.map(|(checksum, synced)| SyncRecord { checksum, synced }))
    }

    async fn set_sync_record(&self, path: &str, record: &SyncRecord) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO sync_status (path, checksum, synced) VALUES (?1, ?2, ?3)")
            .bind(path)
            .bind(&record.checksum)
            .bind(record.synced)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to write sync status for {path}"))?;
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64> {
        let children = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };

        // substr() instead of LIKE so that '%' and '_' in paths stay literal
        let result = sqlx::query(
            "UPDATE sync_status SET synced = 0
             WHERE path = ?1 OR substr(path, 1, length(?2)) = ?2",
        )
        .bind(prefix)
        .bind(&children)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to invalidate sync status under {prefix}"))?;

        Ok(result.rows_affected())
    }
}
