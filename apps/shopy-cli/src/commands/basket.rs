//! # Basket Commands
//!
//! Every mutation is followed by an aggregate recomputation, so the badge
//! and totals published by the notifier always match the basket store.
//!
//! ## Quantity Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  set_quantity(id, q)                                                    │
//! │                                                                         │
//! │   q <= 0, line exists     ──► remove line                               │
//! │   q <= 0, no line         ──► nothing                                   │
//! │   q > 0,  no line         ──► copy title/price/unit from catalog        │
//! │                               (ProductNotFound if not in catalog)       │
//! │   q > 0,  line exists     ──► update quantity, price stays locked in    │
//! │   q > MAX_ITEM_QUANTITY   ──► QuantityTooLarge, nothing changes         │
//! │                                                                         │
//! │  add(id)    = set_quantity(id, current + 1)                             │
//! │  remove(id) = set_quantity(id, current - 1)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Partial Failure
//! The store write commits before the aggregate is recomputed. If the
//! recomputation fails the write is NOT rolled back: the command returns
//! the recomputation error, with a message that says the basket was
//! updated, and the notifier keeps the previous aggregate until the next
//! successful recomputation.

use serde::Serialize;
use shopy_core::{BasketChange, BasketSummary};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Result of a basket mutation.
#[derive(Debug, Clone, Serialize)]
pub struct BasketUpdate {
    /// What the mutation did to the store.
    pub change: BasketChange,
    /// The aggregate after the mutation.
    pub summary: BasketSummary,
}

/// Prices the basket in the selected currency.
pub async fn get_basket(state: &AppState) -> ApiResult<BasketSummary> {
    debug!("get_basket command");
    recompute(state).await
}

/// Sets the quantity of a product in the basket.
///
/// ## Arguments
/// * `product_id` - Catalog id
/// * `quantity` - New quantity (0 or less removes the line)
pub async fn set_quantity(
    state: &AppState,
    product_id: &str,
    quantity: i64,
) -> ApiResult<BasketUpdate> {
    debug!(product_id = %product_id, quantity, "set_quantity command");

    let change = state.db.basket().set_quantity(product_id, quantity).await?;
    finish(state, change).await
}

/// Adds one unit of a product.
pub async fn increment(state: &AppState, product_id: &str) -> ApiResult<BasketUpdate> {
    debug!(product_id = %product_id, "increment command");

    let change = state.db.basket().step(product_id, 1).await?;
    finish(state, change).await
}

/// Removes one unit of a product; the line goes away at zero.
pub async fn decrement(state: &AppState, product_id: &str) -> ApiResult<BasketUpdate> {
    debug!(product_id = %product_id, "decrement command");

    let change = state.db.basket().step(product_id, -1).await?;
    finish(state, change).await
}

/// Empties the basket. Always succeeds, and clearing twice is harmless.
pub async fn clear_basket(state: &AppState) -> ApiResult<BasketSummary> {
    let removed = state.db.basket().clear().await?;
    debug!(removed, "clear_basket command");

    recompute(state)
        .await
        .map_err(|err| saved_without_total(removed > 0, err))
}

/// Publishes the aggregate for the current basket and currency.
pub(crate) async fn recompute(state: &AppState) -> ApiResult<BasketSummary> {
    let context = state.currency.current().await;
    Ok(state
        .notifier
        .recompute_aggregate(&state.db, &context)
        .await?)
}

async fn finish(state: &AppState, change: BasketChange) -> ApiResult<BasketUpdate> {
    match recompute(state).await {
        Ok(summary) => Ok(BasketUpdate { change, summary }),
        Err(err) => Err(saved_without_total(change.is_write(), err)),
    }
}

/// Rewords a recomputation error that follows a committed write.
///
/// The error code is kept so exit codes stay the same.
fn saved_without_total(committed: bool, err: ApiError) -> ApiError {
    if !committed {
        return err;
    }

    warn!(code = ?err.code, error = %err.message, "Basket saved but total not recomputed");
    ApiError::new(
        err.code,
        format!(
            "Basket updated, but the total could not be recomputed: {}",
            err.message
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_committed_write_says_basket_was_updated() {
        let err = saved_without_total(
            true,
            ApiError::validation("Total for basket is too large to compute"),
        );

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.starts_with("Basket updated, but the total"));
        assert!(err.message.ends_with("Total for basket is too large to compute"));
    }

    #[test]
    fn test_no_write_keeps_original_error() {
        let err = saved_without_total(false, ApiError::internal("boom"));

        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "boom");
    }
}
