//! # Currency State
//!
//! The selected display currency and its rate on USD.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            Idle("USD", 1.0)  ◄───────────── start                       │
//! │                 │                                                       │
//! │   select(code)  │                                                       │
//! │                 ▼                                                       │
//! │   code == USD ──────────────────────────► Idle("USD", 1.0)              │
//! │   rate lookup ok, rate > 0 ─────────────► Idle(code, rate)              │
//! │   unreachable / missing quote /                                         │
//! │   invalid rate / unknown code ──────────► Idle("USD", 1.0) + notice     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The context sits behind `Arc<RwLock<_>>`: pricing reads it concurrently,
//! only a selection writes it.

use std::sync::Arc;

use shopy_core::{CurrencyCode, CurrencyTransition, ExchangeContext};
use shopy_sync::{Cancel, RateLookupError, RateSource};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Process-wide exchange context.
#[derive(Debug, Clone, Default)]
pub struct CurrencyState {
    context: Arc<RwLock<ExchangeContext>>,
}

impl CurrencyState {
    /// Creates a state at USD / 1.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active exchange context.
    pub async fn current(&self) -> ExchangeContext {
        self.context.read().await.clone()
    }

    /// Selects a display currency.
    ///
    /// Never fails: a lookup failure is returned as
    /// [`CurrencyTransition::FellBack`] with the state reset to USD / 1.0.
    pub async fn select(
        &self,
        code: &str,
        rates: &dyn RateSource,
        cancel: &Cancel,
    ) -> CurrencyTransition {
        let transition = match CurrencyCode::parse(code) {
            Ok(requested) if requested.is_base() => {
                CurrencyTransition::Switched(ExchangeContext::base())
            }
            Ok(requested) => {
                let lookup = rates.usd_rate(&requested, cancel).await;
                ExchangeContext::resolve(requested, lookup)
            }
            Err(err) => {
                let requested = CurrencyCode::base();
                ExchangeContext::resolve(
                    requested,
                    Err::<f64, _>(RateLookupError::UnsupportedCurrency(format!("{code}: {err}"))),
                )
            }
        };

        match &transition {
            CurrencyTransition::Switched(ctx) => {
                info!(currency = %ctx.currency, rate = ctx.rate, "Display currency selected");
            }
            CurrencyTransition::FellBack { requested, reason, .. } => {
                warn!(requested = %requested, reason = %reason, "Rate lookup failed, using USD");
            }
        }

        *self.context.write().await = transition.context().clone();
        transition
    }
}
