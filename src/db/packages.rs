//! Package store
//!
//! Each package is one row: the id, the serialized package document and
//! the upload timestamp. Every operation is a single statement, so a
//! package is either fully written or absent.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::package::codec::{self, format_timestamp};
use crate::package::{Package, PackageSummary};

/// Durable package persistence keyed by id
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Insert a new package; never overwrites an existing id
    async fn put(&self, package: &Package) -> Result<()>;

    /// Load a full package including content
    async fn get(&self, id: &str) -> Result<Package>;

    /// Summaries of all packages, most recent first
    async fn list(&self) -> Result<Vec<PackageSummary>>;

    /// Remove a package; returns whether a row was deleted
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Stored package row
#[derive(Debug, Clone, sqlx::FromRow)]
struct PackageRow {
    id: String,
    file_data: String,
}

/// SQLite-backed package store
#[derive(Clone)]
pub struct SqlitePackageStore {
    pool: SqlitePool,
}

impl SqlitePackageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PackageStore for SqlitePackageStore {
    async fn put(&self, package: &Package) -> Result<()> {
        let document = codec::serialize_package(package)
            .map_err(|e| AppError::Internal(format!("Failed to serialize package: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO packages (id, file_data, uploaded_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(package.id())
        .bind(&document)
        .bind(format_timestamp(package.uploaded_at()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateId(package.id().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> Result<Package> {
        let row = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, file_data
            FROM packages
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        let package = codec::deserialize_package(&row.file_data).map_err(|e| e.for_record(&row.id))?;

        if package.id() != row.id {
            return Err(AppError::malformed(
                &row.id,
                format!("document id {} does not match row", package.id()),
            ));
        }

        Ok(package)
    }

    async fn list(&self) -> Result<Vec<PackageSummary>> {
        let rows = sqlx::query_as::<_, PackageRow>(
            r#"
            SELECT id, file_data
            FROM packages
            ORDER BY uploaded_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let summaries = rows
            .into_iter()
            .filter_map(|row| match codec::deserialize_summary(&row.file_data) {
                Ok(summary) if summary.id == row.id => Some(summary),
                Ok(summary) => {
                    tracing::warn!(
                        package_id = %row.id,
                        document_id = %summary.id,
                        "Skipping package whose document id does not match its row"
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!(package_id = %row.id, "Skipping malformed package in listing: {}", e);
                    None
                }
            })
            .collect();

        Ok(summaries)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM packages
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::package::FileEntry;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn test_store() -> (TempDir, SqlitePackageStore) {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("packages.db").display());
        let pool = create_pool(&url, 2).await.unwrap();
        (temp_dir, SqlitePackageStore::new(pool))
    }

    fn package(id: &str, minutes_ago: i64) -> Package {
        Package::new(
            id.to_string(),
            vec![FileEntry::new("a.txt", "text/plain", b"abc".to_vec())],
            Utc::now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (_dir, store) = test_store().await;
        let package = package("p1", 0);

        store.put(&package).await.unwrap();
        let loaded = store.get("p1").await.unwrap();

        assert_eq!(loaded, package);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_not_overwritten() {
        let (_dir, store) = test_store().await;
        store.put(&package("p1", 0)).await.unwrap();

        let other = Package::new(
            "p1".to_string(),
            vec![FileEntry::new("b.txt", "text/plain", b"other".to_vec())],
            Utc::now(),
        )
        .unwrap();

        let result = store.put(&other).await;
        assert!(matches!(result, Err(AppError::DuplicateId(id)) if id == "p1"));
        assert_eq!(store.get("p1").await.unwrap().files()[0].name, "a.txt");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (_dir, store) = test_store().await;
        assert!(matches!(store.get("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let (_dir, store) = test_store().await;
        store.put(&package("old", 30)).await.unwrap();
        store.put(&package("new", 0)).await.unwrap();
        store.put(&package("mid", 10)).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_delete_reports_removal() {
        let (_dir, store) = test_store().await;
        store.put(&package("p1", 0)).await.unwrap();

        assert!(store.delete("p1").await.unwrap());
        assert!(!store.delete("p1").await.unwrap());
        assert!(matches!(store.get("p1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_isolated() {
        let (_dir, store) = test_store().await;
        store.put(&package("good", 5)).await.unwrap();

        sqlx::query("INSERT INTO packages (id, file_data) VALUES (?, ?)")
            .bind("bad")
            .bind(r#"{"id":"bad","files":"oops"}"#)
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(
            store.get("bad").await,
            Err(AppError::MalformedRecord { id, .. }) if id == "bad"
        ));
        assert!(store.get("good").await.is_ok());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "good");
    }

    #[tokio::test]
    async fn test_mismatched_document_id_not_listed() {
        let (_dir, store) = test_store().await;
        store.put(&package("good", 5)).await.unwrap();

        let document = codec::serialize_package(&package("other", 0)).unwrap();
        sqlx::query("INSERT INTO packages (id, file_data) VALUES (?, ?)")
            .bind("row-id")
            .bind(&document)
            .execute(&store.pool)
            .await
            .unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["good"]);
        assert!(matches!(
            store.get("row-id").await,
            Err(AppError::MalformedRecord { id, .. }) if id == "row-id"
        ));
    }

    #[tokio::test]
    async fn test_concurrent_deletes_succeed_once() {
        let (_dir, store) = test_store().await;
        store.put(&package("p1", 0)).await.unwrap();

        let (a, b) = tokio::join!(store.delete("p1"), store.delete("p1"));
        let removed = [a.unwrap(), b.unwrap()].iter().filter(|r| **r).count();
        assert_eq!(removed, 1);
    }
}
