// SQLite-backed run option store.
//
// Tables:
// - run_options: one row per (guild, option) that an admin has set

use crate::core::run_options::{RunOption, RunOptionError, RunOptionStore, RunOptionType};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteRunOptionStore {
    pool: Pool<Sqlite>,
}

fn storage_error(e: sqlx::Error) -> RunOptionError {
    RunOptionError::StorageError(e.to_string())
}

impl SqliteRunOptionStore {
    /// Open (creating if needed) the database at `database_path` and migrate it.
    pub async fn open(database_path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", database_path))
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), RunOptionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS run_options (
                guild_id INTEGER NOT NULL,
                option_type INTEGER NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (guild_id, option_type)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}

#[async_trait]
impl RunOptionStore for SqliteRunOptionStore {
    async fn get_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
    ) -> Result<Option<String>, RunOptionError> {
        let row = sqlx::query(
            r#"
            SELECT value FROM run_options
            WHERE guild_id = ? AND option_type = ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(option_type.key())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set_option(
        &self,
        guild_id: u64,
        option_type: RunOptionType,
        value: &str,
    ) -> Result<(), RunOptionError> {
        sqlx::query(
            r#"
            INSERT INTO run_options (guild_id, option_type, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(guild_id, option_type)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(guild_id as i64)
        .bind(option_type.key())
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    async fn list_options(&self, guild_id: u64) -> Result<Vec<RunOption>, RunOptionError> {
        let rows = sqlx::query(
            r#"
            SELECT option_type, value FROM run_options
            WHERE guild_id = ?
            ORDER BY option_type
            "#,
        )
        .bind(guild_id as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut options = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row.get::<i64, _>("option_type");
            match RunOptionType::from_key(key) {
                Some(option_type) => options.push(RunOption {
                    option_type,
                    value: row.get::<String, _>("value"),
                }),
                // Rows from a newer build; ignore rather than fail the whole read
                None => tracing::warn!(guild_id, key, "Skipping unknown run option"),
            }
        }
        Ok(options)
    }
}
