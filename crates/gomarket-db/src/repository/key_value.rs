//! # Key-Value Repository
//!
//! Durable [`KeyValueStore`] on top of the `key_value_store` table.
//!
//! Writes are single-statement upserts, so a value is either fully replaced
//! or left untouched; there is no state where a key holds half a snapshot.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::store::KeyValueStore;

/// Repository for key-value operations.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Lists stored keys in ascending order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar("SELECT key FROM key_value_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Counts stored keys.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM key_value_store")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl KeyValueStore for KeyValueRepository {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM key_value_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        debug!(key = %key, bytes = value.len(), "Writing value");

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> DbResult<()> {
        debug!(key = %key, "Removing value");

        sqlx::query("DELETE FROM key_value_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> (Database, KeyValueRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.key_values();
        (db, repo)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (_db, repo) = repo().await;

        assert_eq!(repo.get_item("@GoMarket:products").await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let (_db, repo) = repo().await;

        repo.set_item("k", "[]").await.unwrap();
        repo.set_item("k", r#"[{"id":"a"}]"#).await.unwrap();

        assert_eq!(
            repo.get_item("k").await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let (_db, repo) = repo().await;
        repo.set_item("b", "2").await.unwrap();
        repo.set_item("a", "1").await.unwrap();

        assert_eq!(repo.keys().await.unwrap(), vec!["a", "b"]);

        repo.remove_item("a").await.unwrap();
        repo.remove_item("missing").await.unwrap();

        assert_eq!(repo.keys().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.key_values().set_item("k", "persisted").await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            db.key_values().get_item("k").await.unwrap().as_deref(),
            Some("persisted")
        );
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_error() {
        let (db, repo) = repo().await;
        db.close().await;

        let err = repo.set_item("k", "v").await.unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
