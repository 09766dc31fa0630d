//! # Badge/Total Notifier
//!
//! Recomputes the basket aggregate and publishes it to observers.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  set / add / remove / clear / order ──┐                                 │
//! │                                       ├──► recompute_aggregate()        │
//! │  select_currency ─────────────────────┘          │                      │
//! │                                                  ▼                      │
//! │                         basket lines (sorted by title)                  │
//! │                         + current ExchangeContext                       │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                        BasketSummary::compute(lines, ctx)               │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │              watch::Sender<BasketSummary> ──► subscribers               │
//! │              (badge "$6.23" / None, "Total Price: EUR 5.30")            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use shopy_core::{BasketSummary, ExchangeContext};
use shopy_db::{DbResult, Database};
use tokio::sync::watch;
use tracing::debug;

/// Publishes the latest [`BasketSummary`].
#[derive(Debug, Clone)]
pub struct AggregateNotifier {
    tx: Arc<watch::Sender<BasketSummary>>,
}

impl Default for AggregateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateNotifier {
    /// Creates a notifier holding the summary of an empty USD basket.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BasketSummary::empty(&ExchangeContext::base()));
        AggregateNotifier { tx: Arc::new(tx) }
    }

    /// A receiver that observes every published aggregate.
    pub fn subscribe(&self) -> watch::Receiver<BasketSummary> {
        self.tx.subscribe()
    }

    /// The most recently published aggregate.
    pub fn latest(&self) -> BasketSummary {
        self.tx.borrow().clone()
    }

    /// Reads the basket, prices it for `context` and publishes the result.
    ///
    /// A total that cannot be computed is returned as an error and the
    /// previously published aggregate stays in place.
    pub async fn recompute_aggregate(
        &self,
        db: &Database,
        context: &ExchangeContext,
    ) -> DbResult<BasketSummary> {
        let lines = db.basket().list_by_title().await?;
        let summary = BasketSummary::compute(&lines, context)?;

        debug!(
            lines = summary.lines.len(),
            currency = %summary.currency,
            total = summary.converted_total,
            badge = ?summary.badge,
            "Basket aggregate recomputed"
        );

        self.tx.send_replace(summary.clone());
        Ok(summary)
    }
}
