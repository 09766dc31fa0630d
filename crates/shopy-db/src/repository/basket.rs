//! # Basket Repository
//!
//! Database operations for basket lines, including the basket mutator.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_quantity("eggs", 2)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  basket write lock ──► BEGIN                                            │
//! │       │                                                                 │
//! │       ├── SELECT line WHERE id = 'eggs'                                │
//! │       ├── SELECT product (only for a first add)                        │
//! │       ├── resolve_quantity_change(..)            (shopy-core)          │
//! │       │        Insert | UpdateQuantity | Remove | Unchanged            │
//! │       ├── apply the change                                             │
//! │       ▼                                                                 │
//! │  COMMIT ──► caller recomputes the basket aggregate                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::catalog::fetch_product;
use shopy_core::basket::{needs_product, stepped_quantity};
use shopy_core::{resolve_quantity_change, BasketChange, BasketLine};

/// How the target quantity of a mutation is expressed.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// Set the quantity to this value.
    Absolute(i64),
    /// Add this (possibly negative) step to the current quantity.
    Step(i64),
}

/// Repository for basket database operations.
///
/// ## Usage
/// ```rust,ignore
/// let basket = db.basket();
///
/// basket.set_quantity("eggs", 2).await?;
/// basket.step("milk", 1).await?;
/// let lines = basket.list_by_title().await?;
/// ```
#[derive(Debug, Clone)]
pub struct BasketRepository {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl BasketRepository {
    /// Creates a new BasketRepository.
    pub fn new(pool: SqlitePool, write_lock: Arc<Mutex<()>>) -> Self {
        BasketRepository { pool, write_lock }
    }

    /// Lists all basket lines sorted by title.
    pub async fn list_by_title(&self) -> DbResult<Vec<BasketLine>> {
        let lines = sqlx::query_as::<_, BasketLine>(
            r#"
            SELECT id, title, unit_price_cents, unit, quantity, added_at, updated_at
            FROM basket_lines
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Deletes every line. Always succeeds on an empty basket.
    pub async fn clear(&self) -> DbResult<u64> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query("DELETE FROM basket_lines")
            .execute(&self.pool)
            .await?;

        info!(removed = result.rows_affected(), "Cleared basket");
        Ok(result.rows_affected())
    }

    /// Sets the quantity of a product in the basket.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line (no-op without one)
    /// - no line: creates one from the catalog product, copying title,
    ///   unit price and unit
    /// - existing line: changes only the quantity (price stays locked in)
    ///
    /// ## Errors
    /// * `DbError::Rejected(CoreError::ProductNotFound)` - first add of an
    ///   id that is not in the catalog
    /// * `DbError::Rejected(CoreError::QuantityTooLarge)` - quantity above
    ///   `MAX_ITEM_QUANTITY`
    pub async fn set_quantity(&self, product_id: &str, quantity: i64) -> DbResult<BasketChange> {
        self.change_quantity(product_id, Target::Absolute(quantity))
            .await
    }

    /// Adds `step` to the current quantity (absent line = 0), clamped at 0.
    pub async fn step(&self, product_id: &str, step: i64) -> DbResult<BasketChange> {
        self.change_quantity(product_id, Target::Step(step)).await
    }

    async fn change_quantity(&self, product_id: &str, target: Target) -> DbResult<BasketChange> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self.pool.begin().await?;

        let existing = fetch_line(&mut tx, product_id).await?;
        let quantity = match target {
            Target::Absolute(quantity) => quantity,
            Target::Step(step) => stepped_quantity(existing.as_ref(), step),
        };

        let product = if needs_product(existing.as_ref(), quantity) {
            fetch_product(&mut tx, product_id).await?
        } else {
            None
        };

        let now = Utc::now();
        let change = resolve_quantity_change(
            product_id,
            existing.as_ref(),
            product.as_ref(),
            quantity,
            now,
        )?;

        match &change {
            BasketChange::Insert(line) => {
                sqlx::query(
                    r#"
                    INSERT INTO basket_lines (id, title, unit_price_cents, unit, quantity, added_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                )
                .bind(line.id.as_str())
                .bind(line.title.as_str())
                .bind(line.unit_price_cents)
                .bind(line.unit.as_str())
                .bind(line.quantity)
                .bind(line.added_at)
                .bind(line.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            BasketChange::UpdateQuantity { id, quantity } => {
                sqlx::query("UPDATE basket_lines SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(id.as_str())
                    .bind(*quantity)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
            }
            BasketChange::Remove { id } => {
                sqlx::query("DELETE FROM basket_lines WHERE id = ?1")
                    .bind(id.as_str())
                    .execute(&mut *tx)
                    .await?;
            }
            BasketChange::Unchanged => {}
        }

        tx.commit().await?;

        debug!(id = %product_id, quantity, change = ?change, "Basket quantity changed");
        Ok(change)
    }
}

async fn fetch_line(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<BasketLine>> {
    let line = sqlx::query_as::<_, BasketLine>(
        r#"
        SELECT id, title, unit_price_cents, unit, quantity, added_at, updated_at
        FROM basket_lines
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(line)
}

// =============================================================================
// Unit Tests
// =============================================================================
