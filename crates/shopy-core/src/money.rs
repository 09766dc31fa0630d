//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  Summing a basket of float prices accumulates that error line by line. │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Feed prices are converted to cents once, at the feed boundary.      │
//! │    Line totals and basket totals are exact integer sums.               │
//! │    Floating point appears only when scaling by an exchange rate,       │
//! │    and rounding happens only when the amount is formatted.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopy_core::money::Money;
//!
//! let price = Money::parse_decimal("1.50").unwrap();
//! assert_eq!(price.cents(), 150);
//!
//! let doubled = price.checked_mul_quantity(2).unwrap();
//! assert_eq!(doubled.to_string(), "$3.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the base currency (US cents).
///
/// ## Where Money is Used
/// ```text
/// RemoteProduct.price ──► Product.unit_price_cents ──► BasketLine.unit_price_cents
///                                                            │
///                                     quantity ──► line total ┤
///                                                            ▼
///                                              basket total × exchange rate
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from an amount in major units (dollars).
    ///
    /// Rounds half away from zero to the nearest cent. Rejects negative and
    /// non-finite amounts since no catalog price can be either.
    ///
    /// ## Example
    /// ```rust
    /// use shopy_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(0.73).unwrap().cents(), 73);
    /// assert_eq!(Money::from_major(2.005).unwrap().cents(), 201);
    /// assert!(Money::from_major(-1.0).is_err());
    /// ```
    pub fn from_major(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: "price".to_string(),
                reason: format!("{amount} is not a finite number"),
            });
        }
        if amount < 0.0 {
            return Err(ValidationError::Negative {
                field: "price".to_string(),
            });
        }

        // Scale through a decimal string so that 2.005 (stored as
        // 2.00499999...) still rounds to the cent a human would expect.
        let scaled: f64 = format!("{:.6}", amount * 100.0)
            .parse()
            .map_err(|_| ValidationError::InvalidFormat {
                field: "price".to_string(),
                reason: format!("{amount} cannot be represented in cents"),
            })?;
        let cents = scaled.round();
        if cents > i64::MAX as f64 {
            return Err(ValidationError::InvalidFormat {
                field: "price".to_string(),
                reason: format!("{amount} is too large"),
            });
        }

        Ok(Money(cents as i64))
    }

    /// Parses a decimal price string such as `"1.50"` or `" 2 "`.
    ///
    /// ## Example
    /// ```rust
    /// use shopy_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("0.73").unwrap().cents(), 73);
    /// assert!(Money::parse_decimal("abc").is_err());
    /// assert!(Money::parse_decimal("").is_err());
    /// ```
    pub fn parse_decimal(text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let amount: f64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("'{text}' is not a number"),
        })?;

        Money::from_major(amount)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount in major units as a float (for display and scaling).
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Converts the amount into another currency, in major units.
    ///
    /// The exchange rate is a plain multiplier on the base-currency amount.
    /// No rounding is applied here.
    ///
    /// ## Example
    /// ```rust
    /// use shopy_core::money::Money;
    ///
    /// let total = Money::from_cents(623);
    /// assert!((total.convert(0.85) - 5.2955).abs() < 1e-9);
    /// assert_eq!(total.convert(0.0), 0.0);
    /// ```
    #[inline]
    pub fn convert(&self, rate: f64) -> f64 {
        self.0 as f64 * rate / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use shopy_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(150); // Eggs, $1.50 a dozen
    /// assert_eq!(unit_price.checked_mul_quantity(2).unwrap().cents(), 300);
    /// assert!(Money::from_cents(i64::MAX).checked_mul_quantity(2).is_none());
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// Display as base-currency amount: `$6.23`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(623)), "$6.23");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_from_major_rounding() {
        assert_eq!(Money::from_major(1.5).unwrap().cents(), 150);
        assert_eq!(Money::from_major(0.125).unwrap().cents(), 13);
        assert_eq!(Money::from_major(1.004).unwrap().cents(), 100);
        assert_eq!(Money::from_major(0.0).unwrap().cents(), 0);
    }

    #[test]
    fn test_from_major_rejects_bad_amounts() {
        assert!(matches!(
            Money::from_major(-0.01),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            Money::from_major(f64::NAN),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            Money::from_major(f64::INFINITY),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("2.00").unwrap().cents(), 200);
        assert_eq!(Money::parse_decimal(" 3 ").unwrap().cents(), 300);
        assert!(matches!(
            Money::parse_decimal("  "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Money::parse_decimal("1,50"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b).unwrap().cents(), 1500);
        assert_eq!(a.checked_mul_quantity(3).unwrap().cents(), 3000);

        assert!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)).is_none());
        assert!(Money::from_cents(i64::MAX / 2).checked_mul_quantity(3).is_none());
    }

    #[test]
    fn test_convert_is_linear() {
        let total = Money::from_cents(623);
        assert!((total.convert(1.0) - 6.23).abs() < 1e-9);
        assert!((total.convert(2.0) - 12.46).abs() < 1e-9);
        assert_eq!(total.convert(0.0), 0.0);
    }
}
