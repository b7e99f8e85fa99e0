//! `PostgreSQL` implementation of the `KeyValueStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use stonecross_core::error::DomainError;
use stonecross_core::store::{KeyValueStore, StoredValue, WriteRequest};

type Row = (serde_json::Value, i64, DateTime<Utc>, Option<DateTime<Utc>>);

fn infra(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

fn to_stored((value, version, updated_at, expires_at): Row) -> StoredValue {
    StoredValue {
        value,
        version,
        updated_at,
        expires_at,
    }
}

/// PostgreSQL-backed key-value store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a migration fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get(&self, key: &str, now: DateTime<Utc>) -> Result<Option<StoredValue>, DomainError> {
        let row: Option<Row> = sqlx::query_as(
            "SELECT value, version, updated_at, expires_at FROM kv_entries \
             WHERE key = $1 AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;

        Ok(row.map(to_stored))
    }

    async fn put(&self, key: &str, write: WriteRequest) -> Result<StoredValue, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;

        let existing: Option<(i64, Option<DateTime<Utc>>)> =
            sqlx::query_as("SELECT version, expires_at FROM kv_entries WHERE key = $1 FOR UPDATE")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await
                .map_err(infra)?;

        let actual = match existing {
            Some((version, expires_at)) if !expires_at.is_some_and(|at| at <= write.written_at) => {
                version
            }
            _ => 0,
        };

        if let Some(expected) = write.expected_version {
            if expected != actual {
                return Err(DomainError::ConcurrencyConflict {
                    key: key.to_owned(),
                    expected,
                    actual,
                });
            }
        }

        let row: Option<Row> = if existing.is_some() {
            sqlx::query_as(
                "UPDATE kv_entries SET value = $2, version = $3, updated_at = $4, expires_at = $5 \
                 WHERE key = $1 \
                 RETURNING value, version, updated_at, expires_at",
            )
            .bind(key)
            .bind(&write.value)
            .bind(actual + 1)
            .bind(write.written_at)
            .bind(write.expires_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infra)?
        } else if write.expected_version.is_some() {
            // Row locks do not cover absent keys; let the primary key arbitrate.
            sqlx::query_as(
                "INSERT INTO kv_entries (key, value, version, updated_at, expires_at) \
                 VALUES ($1, $2, 1, $3, $4) \
                 ON CONFLICT (key) DO NOTHING \
                 RETURNING value, version, updated_at, expires_at",
            )
            .bind(key)
            .bind(&write.value)
            .bind(write.written_at)
            .bind(write.expires_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infra)?
        } else {
            sqlx::query_as(
                "INSERT INTO kv_entries (key, value, version, updated_at, expires_at) \
                 VALUES ($1, $2, 1, $3, $4) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, \
                     version = kv_entries.version + 1, updated_at = EXCLUDED.updated_at, \
                     expires_at = EXCLUDED.expires_at \
                 RETURNING value, version, updated_at, expires_at",
            )
            .bind(key)
            .bind(&write.value)
            .bind(write.written_at)
            .bind(write.expires_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(infra)?
        };

        let Some(row) = row else {
            debug!(key, "lost insert race");
            return Err(DomainError::ConcurrencyConflict {
                key: key.to_owned(),
                expected: write.expected_version.unwrap_or(0),
                actual: actual + 1,
            });
        };

        tx.commit().await.map_err(infra)?;
        Ok(to_stored(row))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_to_set(&self, key: &str, member: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO kv_set_members (set_key, member) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(key)
        .bind(member)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT member FROM kv_set_members WHERE set_key = $1 ORDER BY member")
                .bind(key)
                .fetch_all(&self.pool)
                .await
                .map_err(infra)?;
        Ok(rows.into_iter().map(|(member,)| member).collect())
    }

    async fn clear_set(&self, key: &str) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM kv_set_members WHERE set_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        usize::try_from(result.rows_affected())
            .map_err(|e| DomainError::Infrastructure(format!("set size out of range: {e}")))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
