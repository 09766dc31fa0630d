//! # Checkout Commands
//!
//! Currency selection, the checkout view, and placing the order.
//!
//! ## Checkout Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout --currency EUR                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  select_currency("EUR") ──► rate lookup ──► Idle("EUR", 0.85)           │
//! │       │                          │ fails                                │
//! │       │                          └────────► Idle("USD", 1.0) + notice   │
//! │       ▼                                                                 │
//! │  recompute_aggregate ──► "Total Price: EUR 5.30"                        │
//! │                                                                         │
//! │  order ──► checkout view captured ──► basket cleared ──► receipt       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopy_core::{BasketSummary, CurrencyTransition, SUPPORTED_CURRENCIES};
use tracing::{debug, info};

use crate::commands::basket::recompute;
use crate::error::ApiResult;
use crate::state::AppState;

/// The checkout view.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub summary: BasketSummary,
    /// Set when a requested currency could not be used.
    pub notice: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReceipt {
    /// The checkout view at the moment the order was placed.
    pub summary: BasketSummary,
    pub notice: Option<String>,
    /// Basket lines removed by the order.
    pub cleared_lines: u64,
    pub placed_at: DateTime<Utc>,
}

/// Selects the display currency and republishes the aggregate.
///
/// Rate lookup failures are not errors: the currency reverts to USD / 1.0
/// and the failure is returned as a notice.
pub async fn select_currency(state: &AppState, code: &str) -> ApiResult<CheckoutView> {
    debug!(code = %code, "select_currency command");

    let transition = state
        .currency
        .select(code, state.rates.as_ref(), &state.cancel)
        .await;

    let notice = match transition {
        CurrencyTransition::Switched(_) => None,
        CurrencyTransition::FellBack {
            requested, reason, ..
        } => Some(format!(
            "Could not use {}: {}. Showing prices in USD.",
            requested, reason
        )),
    };

    let summary = recompute(state).await?;
    Ok(CheckoutView { summary, notice })
}

/// The checkout view, optionally switching currency first.
pub async fn checkout(state: &AppState, currency: Option<&str>) -> ApiResult<CheckoutView> {
    match currency {
        Some(code) => select_currency(state, code).await,
        None => {
            debug!("checkout command");
            let summary = recompute(state).await?;
            Ok(CheckoutView {
                summary,
                notice: None,
            })
        }
    }
}

/// Places the order: captures the checkout view, then clears the basket.
pub async fn place_order(state: &AppState, currency: Option<&str>) -> ApiResult<OrderReceipt> {
    let view = checkout(state, currency).await?;
    let cleared_lines = state.db.basket().clear().await?;

    info!(
        lines = cleared_lines,
        currency = %view.summary.currency,
        total = %view.summary.total_label,
        "Order placed"
    );

    recompute(state).await?;

    Ok(OrderReceipt {
        summary: view.summary,
        notice: view.notice,
        cleared_lines,
        placed_at: Utc::now(),
    })
}

/// Currencies offered by the picker.
pub fn list_currencies() -> Vec<&'static str> {
    SUPPORTED_CURRENCIES.to_vec()
}
