//! # Catalog Repository
//!
//! Database operations for catalog products.
//!
//! ## Key Operations
//! - Listing sorted by title
//! - Lookup by id
//! - Full replace from a sync payload, in one transaction
//!
//! ## Full Replace
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  replace_all(products)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog write lock ──► BEGIN                                           │
//! │       │                                                                 │
//! │       ├── SELECT id FROM products                                      │
//! │       ├── plan_catalog_merge(local ids, products)   (shopy-core)       │
//! │       ├── upsert inserts + updates                                     │
//! │       ├── delete ids absent from the payload                           │
//! │       ▼                                                                 │
//! │  COMMIT  (any error: ROLLBACK, catalog unchanged)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::DbResult;
use shopy_core::{plan_catalog_merge, Product};

/// Counts produced by [`CatalogRepository::replace_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceSummary {
    /// Products that did not exist before.
    pub inserted: usize,
    /// Existing products whose fields were overwritten.
    pub updated: usize,
    /// Local products absent from the payload.
    pub deleted: usize,
    /// Products in the catalog afterwards.
    pub total: usize,
}

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.catalog();
///
/// let summary = repo.replace_all(products).await?;
/// let listed = repo.list_by_title().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool, write_lock: Arc<Mutex<()>>) -> Self {
        CatalogRepository { pool, write_lock }
    }

    /// Lists all products sorted by title.
    pub async fn list_by_title(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, unit_price_cents, unit, synced_at
            FROM products
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed catalog");
        Ok(products)
    }

    /// Makes the catalog contain exactly `products`.
    ///
    /// Ids in `products` must be unique (see
    /// `shopy_core::catalog::products_from_feed`). Runs as one transaction:
    /// on error nothing is written.
    pub async fn replace_all(&self, products: Vec<Product>) -> DbResult<ReplaceSummary> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self.pool.begin().await?;

        let local_ids = fetch_ids(&mut tx).await?;
        let merge = plan_catalog_merge(&local_ids, products);

        for product in merge.inserts.iter().chain(merge.updates.iter()) {
            upsert_product(&mut tx, product).await?;
        }

        for id in &merge.deletions {
            sqlx::query("DELETE FROM products WHERE id = ?1")
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let summary = ReplaceSummary {
            inserted: merge.inserts.len(),
            updated: merge.updates.len(),
            deleted: merge.deletions.len(),
            total: merge.resulting_len(),
        };

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            total = summary.total,
            "Catalog replaced"
        );

        Ok(summary)
    }
}

// =============================================================================
// Connection-level helpers (shared by pool and transaction paths)
// =============================================================================

/// Reads one product; also used by the basket mutator inside its transaction.
pub(crate) async fn fetch_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, title, unit_price_cents, unit, synced_at
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

async fn fetch_ids(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM products ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(ids)
}

async fn upsert_product(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO products (id, title, unit_price_cents, unit, synced_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            unit_price_cents = excluded.unit_price_cents,
            unit = excluded.unit,
            synced_at = excluded.synced_at
        "#,
    )
    .bind(product.id.as_str())
    .bind(product.title.as_str())
    .bind(product.unit_price_cents)
    .bind(product.unit.as_str())
    .bind(product.synced_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::Utc;
    use shopy_core::Product;

    fn product(id: &str, title: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            unit_price_cents: cents,
            unit: "pc".to_string(),
            synced_at: Utc::now(),
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn sorted_ids(db: &Database) -> Vec<String> {
        let mut ids: Vec<String> = db
            .catalog()
            .list_by_title()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_title() {
        let db = db().await;
        let repo = db.catalog();

        repo.replace_all(vec![
            product("p2", "Milk", 200),
            product("p1", "Beans", 73),
            product("p3", "Eggs", 150),
        ])
        .await
        .unwrap();

        let titles: Vec<String> = repo
            .list_by_title()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Beans", "Eggs", "Milk"]);
    }

    #[tokio::test]
    async fn test_fetch_missing_product() {
        let db = db().await;
        let mut conn = db.pool().acquire().await.unwrap();
        assert!(super::fetch_product(&mut conn, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_all_is_full_replace() {
        let db = db().await;
        let repo = db.catalog();

        let first = repo
            .replace_all(vec![product("eggs", "Eggs", 150), product("milk", "Milk", 200)])
            .await
            .unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.total, 2);

        let second = repo
            .replace_all(vec![product("milk", "Whole Milk", 210), product("beans", "Beans", 73)])
            .await
            .unwrap();
        assert_eq!(second.inserted, 1);
        assert_eq!(second.updated, 1);
        assert_eq!(second.deleted, 1);
        assert_eq!(second.total, 2);

        assert_eq!(sorted_ids(&db).await, vec!["beans", "milk"]);
        let mut conn = db.pool().acquire().await.unwrap();
        let milk = super::fetch_product(&mut conn, "milk").await.unwrap().unwrap();
        assert_eq!(milk.title, "Whole Milk");
        assert_eq!(milk.unit_price_cents, 210);
    }

    #[tokio::test]
    async fn test_replace_all_with_empty_payload_empties_catalog() {
        let db = db().await;
        let repo = db.catalog();

        repo.replace_all(vec![product("eggs", "Eggs", 150)]).await.unwrap();
        let summary = repo.replace_all(Vec::new()).await.unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.total, 0);
        assert!(sorted_ids(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_replace_rolls_back() {
        let db = db().await;
        let repo = db.catalog();

        repo.replace_all(vec![product("eggs", "Eggs", 150)]).await.unwrap();

        // Negative price violates the CHECK constraint on the second row.
        let err = repo
            .replace_all(vec![product("milk", "Milk", 200), product("bad", "Bad", -1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        assert_eq!(sorted_ids(&db).await, vec!["eggs"]);
    }
}
