//! # Pricing Engine
//!
//! Line and basket totals, scaled by an externally supplied exchange rate.
//!
//! ## Numeric Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price_cents × quantity  ──► exact integer cents per line          │
//! │  Σ line cents                 ──► exact integer cents for the basket    │
//! │  cents × rate / 100           ──► f64 amount in the display currency    │
//! │  format_amount(amount)        ──► "5.30" (half-up, two decimals)        │
//! │                                                                         │
//! │  Rounding happens ONLY in format_amount. Nothing rounded is stored.    │
//! │  Integer steps are checked: overflow is CoreError::TotalOverflow.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::currency::ExchangeContext;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::BasketLine;

// =============================================================================
// Totals
// =============================================================================

/// Total of one line in the display currency: `unit_price × quantity × rate`.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use shopy_core::pricing::line_total;
/// use shopy_core::BasketLine;
///
/// let now = Utc::now();
/// let eggs = BasketLine {
///     id: "eggs".into(),
///     title: "Eggs".into(),
///     unit_price_cents: 150,
///     unit: "dozen".into(),
///     quantity: 2,
///     added_at: now,
///     updated_at: now,
/// };
/// assert!((line_total(&eggs, 1.0).unwrap() - 3.0).abs() < 1e-9);
/// ```
pub fn line_total(line: &BasketLine, rate: f64) -> CoreResult<f64> {
    Ok(line.line_total()?.convert(rate))
}

/// Basket total in the base currency, exact.
pub fn native_total(lines: &[BasketLine]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |total, line| {
        total
            .checked_add(line.line_total()?)
            .ok_or_else(|| CoreError::TotalOverflow {
                item: "basket".to_string(),
            })
    })
}

/// Total of all lines in the display currency.
///
/// Equal to the sum of [`line_total`] over the lines; computed as the exact
/// cent sum scaled once so no per-line float error accumulates.
pub fn basket_total(lines: &[BasketLine], rate: f64) -> CoreResult<f64> {
    Ok(native_total(lines)?.convert(rate))
}

// =============================================================================
// Formatting
// =============================================================================

/// Rounds an amount to whole cents, half away from zero.
pub fn round_to_cents(amount: f64) -> i64 {
    // Going through a fixed-precision string keeps 1.005 (stored as
    // 1.00499999...) on the side a human would round it to.
    let scaled = format!("{:.6}", amount * 100.0)
        .parse::<f64>()
        .unwrap_or(amount * 100.0);
    scaled.round() as i64
}

/// Formats an amount with exactly two decimals.
///
/// ## Example
/// ```rust
/// use shopy_core::pricing::format_amount;
///
/// assert_eq!(format_amount(6.23), "6.23");
/// assert_eq!(format_amount(5.2955), "5.30");
/// assert_eq!(format_amount(1.005), "1.01");
/// assert_eq!(format_amount(0.0), "0.00");
/// ```
pub fn format_amount(amount: f64) -> String {
    let cents = round_to_cents(amount);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, cents / 100, cents % 100)
}

/// Formats an amount prefixed with its currency code: `USD 6.23`.
pub fn format_with_currency(currency: &str, amount: f64) -> String {
    format!("{} {}", currency, format_amount(amount))
}

// =============================================================================
// Summaries
// =============================================================================

/// A basket line priced in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSummary {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub native_total: Money,
    pub converted_total: f64,
    /// `"USD 3.00 for 2 Items"`.
    pub label: String,
}

impl LineSummary {
    pub fn new(line: &BasketLine, context: &ExchangeContext) -> CoreResult<Self> {
        let native_total = line.line_total()?;
        let converted_total = native_total.convert(context.rate);
        Ok(LineSummary {
            id: line.id.clone(),
            title: line.title.clone(),
            unit: line.unit.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price(),
            native_total,
            converted_total,
            label: format!(
                "{} for {} Items",
                format_with_currency(context.currency.as_str(), converted_total),
                line.quantity
            ),
        })
    }
}

/// Everything the basket badge and the checkout view display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketSummary {
    pub currency: String,
    pub rate: f64,
    pub lines: Vec<LineSummary>,
    pub total_quantity: i64,
    /// Total at rate 1.0.
    pub native_total: Money,
    /// Total at the selected rate.
    pub converted_total: f64,
    /// `"$6.23"`, or `None` when the basket total is exactly zero.
    pub badge: Option<String>,
    /// `"Total Price: USD 6.23"`.
    pub total_label: String,
}

impl BasketSummary {
    /// Prices `lines` for the given exchange context.
    ///
    /// ## Errors
    /// `CoreError::TotalOverflow` when a line or the basket total does not
    /// fit in i64 cents. Nothing is published in that case.
    pub fn compute(lines: &[BasketLine], context: &ExchangeContext) -> CoreResult<Self> {
        let native = native_total(lines)?;
        let priced = lines
            .iter()
            .map(|line| LineSummary::new(line, context))
            .collect::<CoreResult<Vec<_>>>()?;
        let total_quantity = lines
            .iter()
            .try_fold(0i64, |sum, line| sum.checked_add(line.quantity))
            .ok_or_else(|| CoreError::TotalOverflow {
                item: "quantity".to_string(),
            })?;

        Ok(BasketSummary::assemble(priced, total_quantity, native, context))
    }

    /// Summary of an empty basket.
    pub fn empty(context: &ExchangeContext) -> Self {
        BasketSummary::assemble(Vec::new(), 0, Money::zero(), context)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn assemble(
        lines: Vec<LineSummary>,
        total_quantity: i64,
        native: Money,
        context: &ExchangeContext,
    ) -> Self {
        let converted_total = native.convert(context.rate);

        BasketSummary {
            currency: context.currency.to_string(),
            rate: context.rate,
            lines,
            total_quantity,
            native_total: native,
            converted_total,
            badge: badge_text(native),
            total_label: format!(
                "Total Price: {}",
                format_with_currency(context.currency.as_str(), converted_total)
            ),
        }
    }
}

/// Badge text for a native total; suppressed when the total is zero.
pub fn badge_text(native: Money) -> Option<String> {
    if native.is_zero() {
        None
    } else {
        Some(native.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use chrono::Utc;

    fn line(id: &str, title: &str, cents: i64, quantity: i64) -> BasketLine {
        let now = Utc::now();
        BasketLine {
            id: id.to_string(),
            title: title.to_string(),
            unit_price_cents: cents,
            unit: "pc".to_string(),
            quantity,
            added_at: now,
            updated_at: now,
        }
    }

    fn groceries() -> Vec<BasketLine> {
        vec![
            line("beans", "Beans", 73, 1),
            line("eggs", "Eggs", 150, 2),
            line("milk", "Milk", 250, 1),
        ]
    }

    fn eur(rate: f64) -> ExchangeContext {
        ExchangeContext {
            currency: CurrencyCode::parse("EUR").unwrap(),
            rate,
        }
    }

    #[test]
    fn test_basket_total_in_usd() {
        let lines = groceries();
        assert_eq!(native_total(&lines).unwrap().cents(), 623);
        assert!((basket_total(&lines, 1.0).unwrap() - 6.23).abs() < 1e-9);
    }

    #[test]
    fn test_basket_total_matches_sum_of_lines() {
        let lines = groceries();
        for rate in [0.0, 0.85, 1.0, 1.3333, 7.5] {
            let by_lines: f64 = lines.iter().map(|l| line_total(l, rate).unwrap()).sum();
            let total = basket_total(&lines, rate).unwrap();
            assert!((total - by_lines).abs() < 1e-9);
            assert!((total - 6.23 * rate).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_rate_gives_zero_total() {
        assert_eq!(basket_total(&groceries(), 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_basket_total_is_zero() {
        assert_eq!(basket_total(&[], 0.85).unwrap(), 0.0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(6.23), "6.23");
        assert_eq!(format_amount(12.0), "12.00");
        assert_eq!(format_amount(0.004), "0.00");
        assert_eq!(format_amount(0.005), "0.01");
        assert_eq!(format_amount(-1.5), "-1.50");
    }

    #[test]
    fn test_summary_in_usd() {
        let summary = BasketSummary::compute(&groceries(), &ExchangeContext::base()).unwrap();

        assert_eq!(summary.total_label, "Total Price: USD 6.23");
        assert_eq!(summary.badge.as_deref(), Some("$6.23"));
        assert_eq!(summary.total_quantity, 4);
        assert_eq!(summary.lines[1].label, "USD 3.00 for 2 Items");
    }

    #[test]
    fn test_summary_in_eur_keeps_native_badge() {
        let summary = BasketSummary::compute(&groceries(), &eur(0.85)).unwrap();

        assert_eq!(summary.total_label, "Total Price: EUR 5.30");
        assert_eq!(summary.badge.as_deref(), Some("$6.23"));
        assert_eq!(summary.lines[2].label, "EUR 2.13 for 1 Items");
    }

    #[test]
    fn test_empty_summary_suppresses_badge() {
        let summary = BasketSummary::empty(&ExchangeContext::base());
        assert!(summary.is_empty());
        assert_eq!(summary.badge, None);
        assert_eq!(summary.total_label, "Total Price: USD 0.00");
    }

    #[test]
    fn test_free_items_suppress_badge() {
        let summary =
            BasketSummary::compute(&[line("bag", "Bag", 0, 3)], &ExchangeContext::base()).unwrap();
        assert!(!summary.is_empty());
        assert_eq!(summary.badge, None);
    }

    #[test]
    fn test_largest_accepted_basket_is_priced() {
        use crate::MAX_ITEM_QUANTITY;
        use crate::validation::MAX_PRICE_CENTS;

        let lines: Vec<_> = (0..100)
            .map(|i| line(&format!("p{i}"), "Dear", MAX_PRICE_CENTS, MAX_ITEM_QUANTITY))
            .collect();
        let summary = BasketSummary::compute(&lines, &ExchangeContext::base()).unwrap();
        assert_eq!(
            summary.native_total.cents(),
            MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * 100
        );
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let lines = vec![line("bulk", "Bulk", i64::MAX / 100, 1_000)];
        assert!(matches!(
            BasketSummary::compute(&lines, &ExchangeContext::base()),
            Err(CoreError::TotalOverflow { ref item }) if item == "bulk"
        ));
    }

    #[test]
    fn test_overflowing_basket_sum_is_an_error() {
        let lines = vec![
            line("a", "A", i64::MAX / 2, 1),
            line("b", "B", i64::MAX / 2, 1),
            line("c", "C", 10, 1),
        ];
        assert!(matches!(
            native_total(&lines),
            Err(CoreError::TotalOverflow { ref item }) if item == "basket"
        ));
    }
}
