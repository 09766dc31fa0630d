//! # Currency Selection
//!
//! The exchange context (selected display currency + multiplier relative to
//! USD) and the state machine that changes it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Currency Selection State Machine                       │
//! │                                                                         │
//! │                   ┌──────────────────────┐                              │
//! │                   │ Idle(currency, rate) │ ◄── start: Idle("USD", 1.0)  │
//! │                   └──────────┬───────────┘                              │
//! │                              │ select_currency(code)                    │
//! │                              ▼                                          │
//! │                      external rate lookup                               │
//! │                     ┌────────┴─────────┐                                │
//! │                 ok(rate > 0)        failure                             │
//! │                     │                  │                                │
//! │                     ▼                  ▼                                │
//! │          Idle(code, rate)      Idle("USD", 1.0)  + notice               │
//! │                                                                         │
//! │  No terminal state: the user can pick again at any time.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lookup itself lives in shopy-sync; this module only decides what the
//! outcome of a lookup means.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::validate_currency_code;
use crate::BASE_CURRENCY;

// =============================================================================
// Currency Code
// =============================================================================

/// A normalized three-letter currency code ("USD", "EUR").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a code.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        validate_currency_code(code).map(CurrencyCode)
    }

    /// The base currency every price is stored in.
    pub fn base() -> Self {
        CurrencyCode(BASE_CURRENCY.to_string())
    }

    /// Returns true for the base currency.
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CurrencyCode::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

// =============================================================================
// Exchange Context
// =============================================================================

/// The selected display currency and its multiplier on USD prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeContext {
    pub currency: CurrencyCode,
    pub rate: f64,
}

impl Default for ExchangeContext {
    /// `("USD", 1.0)`.
    fn default() -> Self {
        ExchangeContext::base()
    }
}

impl ExchangeContext {
    /// The base context: USD at rate 1.0.
    pub fn base() -> Self {
        ExchangeContext {
            currency: CurrencyCode::base(),
            rate: 1.0,
        }
    }

    /// Returns true if `rate` can be used as an exchange multiplier.
    pub fn is_usable_rate(rate: f64) -> bool {
        rate.is_finite() && rate > 0.0
    }

    /// Applies the outcome of a rate lookup for `requested`.
    ///
    /// Any failure, including a rate that is zero, negative or not finite,
    /// resets the context to USD / 1.0.
    ///
    /// ## Example
    /// ```rust
    /// use shopy_core::currency::{CurrencyCode, CurrencyTransition, ExchangeContext};
    ///
    /// let eur = CurrencyCode::parse("EUR").unwrap();
    /// let next = ExchangeContext::resolve(eur, Ok::<f64, String>(0.85));
    /// assert_eq!(next.context().currency.as_str(), "EUR");
    ///
    /// let xyz = CurrencyCode::parse("XYZ").unwrap();
    /// let next = ExchangeContext::resolve(xyz, Err("no quote".to_string()));
    /// assert!(matches!(next, CurrencyTransition::FellBack { .. }));
    /// assert_eq!(next.context().rate, 1.0);
    /// ```
    pub fn resolve<E: fmt::Display>(
        requested: CurrencyCode,
        lookup: Result<f64, E>,
    ) -> CurrencyTransition {
        match lookup {
            Ok(rate) if Self::is_usable_rate(rate) => CurrencyTransition::Switched(ExchangeContext {
                currency: requested,
                rate,
            }),
            Ok(rate) => CurrencyTransition::FellBack {
                requested,
                reason: format!("unusable exchange rate {rate}"),
                context: ExchangeContext::base(),
            },
            Err(err) => CurrencyTransition::FellBack {
                requested,
                reason: err.to_string(),
                context: ExchangeContext::base(),
            },
        }
    }
}

/// The outcome of a currency selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CurrencyTransition {
    /// The requested currency is now active.
    Switched(ExchangeContext),
    /// The lookup failed; the base context is active again.
    FellBack {
        requested: CurrencyCode,
        reason: String,
        context: ExchangeContext,
    },
}

impl CurrencyTransition {
    /// The context that is active after the transition.
    pub fn context(&self) -> &ExchangeContext {
        match self {
            CurrencyTransition::Switched(context) => context,
            CurrencyTransition::FellBack { context, .. } => context,
        }
    }

    pub fn into_context(self) -> ExchangeContext {
        match self {
            CurrencyTransition::Switched(context) => context,
            CurrencyTransition::FellBack { context, .. } => context,
        }
    }
}
