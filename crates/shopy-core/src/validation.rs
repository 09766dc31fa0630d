//! # Validation Module
//!
//! Input validation utilities for Shopy.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Feed boundary (shopy-sync)                                   │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: id / title / unit / price rules per record           │
//! │           price ceiling keeps every basket total inside i64 cents      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Commands (shopy-cli)                                         │
//! │  └── THIS MODULE: currency codes typed by the user                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY on id (one product / one line per id)                 │
//! │  └── CHECK (quantity > 0) on basket lines                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopy_core::validation::{validate_currency_code, validate_product_id};
//!
//! validate_product_id("eggs").unwrap();
//! assert_eq!(validate_currency_code(" eur ").unwrap(), "EUR");
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Highest accepted unit price: $10,000,000.00.
///
/// At `MAX_ITEM_QUANTITY` units a line stays below 3.3e13 cents, so a basket
/// needs more than 280,000 such lines before its total leaves `i64`.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product identifier coming from the feed or the user.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 100 characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a product title.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a unit label. Empty labels are allowed.
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    if unit.trim().len() > 50 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 50,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price in cents.
///
/// ## Rules
/// - Must be non-negative (0 = free item)
/// - At most [`MAX_PRICE_CENTS`]
///
/// ## Example
/// ```rust
/// use shopy_core::validation::{validate_price_cents, MAX_PRICE_CENTS};
///
/// assert!(validate_price_cents(150).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates and normalizes a currency code.
///
/// ## Rules
/// - Exactly three ASCII letters after trimming
/// - Case-insensitive; returned upper-cased
///
/// ## Example
/// ```rust
/// use shopy_core::validation::validate_currency_code;
///
/// assert_eq!(validate_currency_code("chf").unwrap(), "CHF");
/// assert!(validate_currency_code("EURO").is_err());
/// assert!(validate_currency_code("E1R").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter code".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("eggs").is_ok());
        assert!(validate_product_id("1111").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Milk").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("").is_ok());
        assert!(validate_unit("dozen").is_ok());
        assert!(validate_unit(&"u".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(73).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());

        assert!(matches!(
            validate_price_cents(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert_eq!(validate_currency_code("USD").unwrap(), "USD");
        assert_eq!(validate_currency_code("gbp").unwrap(), "GBP");

        assert!(validate_currency_code("").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("US D").is_err());
    }
}
