//! # Basket Rules
//!
//! Decides what a quantity change does to the basket store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 set_quantity(product_id, quantity)                      │
//! │                                                                         │
//! │   quantity <= 0 ──┬── line exists ──────────► Remove                    │
//! │                   └── no line ──────────────► Unchanged                 │
//! │                                                                         │
//! │   quantity > 0 ───┬── line exists ──────────► UpdateQuantity            │
//! │                   │                            (price stays locked in)  │
//! │                   └── no line ─┬─ product ──► Insert (snapshot)         │
//! │                                └─ missing ──► ProductNotFound           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer reads the current line (and, when needed, the product)
//! inside a transaction, asks [`resolve_quantity_change`] what to do, and
//! applies the returned [`BasketChange`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{BasketLine, Product};
use crate::MAX_ITEM_QUANTITY;

/// The effect of a quantity change on the basket store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BasketChange {
    /// Create a new line.
    Insert(BasketLine),
    /// Change the quantity of an existing line.
    UpdateQuantity { id: String, quantity: i64 },
    /// Delete an existing line.
    Remove { id: String },
    /// Nothing to do.
    Unchanged,
}

impl BasketChange {
    /// Returns true if applying the change writes to the store.
    pub fn is_write(&self) -> bool {
        !matches!(self, BasketChange::Unchanged)
    }
}

/// Returns true when resolving a change for `quantity` needs the catalog
/// product (no line yet and a positive quantity).
pub fn needs_product(existing: Option<&BasketLine>, quantity: i64) -> bool {
    existing.is_none() && quantity > 0
}

/// Resolves a quantity change against the current basket line.
///
/// ## Arguments
/// * `product_id` - Catalog id the change refers to
/// * `existing` - The current basket line for that id, if any
/// * `product` - The catalog product; only consulted when a line must be created
/// * `quantity` - Desired quantity (<= 0 removes)
/// * `now` - Timestamp for newly created lines
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use shopy_core::basket::{resolve_quantity_change, BasketChange};
///
/// let change = resolve_quantity_change("eggs", None, None, 0, Utc::now()).unwrap();
/// assert_eq!(change, BasketChange::Unchanged);
/// ```
pub fn resolve_quantity_change(
    product_id: &str,
    existing: Option<&BasketLine>,
    product: Option<&Product>,
    quantity: i64,
    now: DateTime<Utc>,
) -> CoreResult<BasketChange> {
    if quantity <= 0 {
        return Ok(match existing {
            Some(line) => BasketChange::Remove {
                id: line.id.clone(),
            },
            None => BasketChange::Unchanged,
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }

    match existing {
        Some(line) if line.quantity == quantity => Ok(BasketChange::Unchanged),
        Some(line) => Ok(BasketChange::UpdateQuantity {
            id: line.id.clone(),
            quantity,
        }),
        None => {
            let product = product
                .filter(|p| p.id == product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            Ok(BasketChange::Insert(BasketLine::from_product(
                product, quantity, now,
            )))
        }
    }
}

/// Quantity after a relative step (the shop screen's "+" / "−" buttons).
///
/// An absent line counts as zero; the result never goes below zero.
///
/// ## Example
/// ```rust
/// use shopy_core::basket::stepped_quantity;
///
/// assert_eq!(stepped_quantity(None, 1), 1);
/// assert_eq!(stepped_quantity(None, -1), 0);
/// ```
pub fn stepped_quantity(existing: Option<&BasketLine>, step: i64) -> i64 {
    let current = existing.map(|line| line.quantity).unwrap_or(0);
    current.saturating_add(step).max(0)
}
