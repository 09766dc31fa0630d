//! # Domain Types
//!
//! Core domain types used throughout Shopy.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   sync    ┌─────────────────┐                     │
//! │  │ RemoteProduct   │ ────────► │    Product      │                     │
//! │  │  ─────────────  │           │  ─────────────  │                     │
//! │  │  id             │           │  id (feed id)   │                     │
//! │  │  title          │           │  title          │                     │
//! │  │  price (num|str)│           │  price_cents    │                     │
//! │  │  unit           │           │  unit           │                     │
//! │  └─────────────────┘           └────────┬────────┘                     │
//! │                                         │ first add (snapshot)         │
//! │                                         ▼                               │
//! │                                ┌─────────────────┐                     │
//! │                                │   BasketLine    │                     │
//! │                                │  ─────────────  │                     │
//! │                                │  id (= product) │                     │
//! │                                │  title, unit    │                     │
//! │                                │  price_cents    │  ← locked in         │
//! │                                │  quantity > 0   │                     │
//! │                                └─────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Products are keyed by the feed's own stable identifier. A basket line is
//! keyed by the id of the product it was created from; that id is the only
//! link between the two stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_price_cents, validate_product_id, validate_title, validate_unit};

// =============================================================================
// Product
// =============================================================================

/// A catalog entry, as last written by a catalog sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Stable external identifier from the feed.
    pub id: String,

    /// Display title ("Eggs", "Milk").
    pub title: String,

    /// Unit price in cents.
    pub unit_price_cents: i64,

    /// Unit label ("dozen", "kg").
    pub unit: String,

    /// When the sync run that last wrote this product happened.
    pub synced_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Basket Line
// =============================================================================

/// A product selected into the basket.
///
/// Uses the snapshot pattern: title, unit price and unit are copied from the
/// product when the line is first created and never re-read afterwards, so a
/// later catalog price change does not alter what the basket quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BasketLine {
    /// Id of the originating product.
    pub id: String,

    /// Title at time of add (frozen).
    pub title: String,

    /// Unit price in cents at time of add (frozen).
    pub unit_price_cents: i64,

    /// Unit label at time of add (frozen).
    pub unit: String,

    /// Quantity, always > 0 while the line exists.
    pub quantity: i64,

    /// When the line was first created.
    pub added_at: DateTime<Utc>,

    /// When the quantity was last changed.
    pub updated_at: DateTime<Utc>,
}

impl BasketLine {
    /// Creates a new line from a product and a quantity.
    pub fn from_product(product: &Product, quantity: i64, now: DateTime<Utc>) -> Self {
        BasketLine {
            id: product.id.clone(),
            title: product.title.clone(),
            unit_price_cents: product.unit_price_cents,
            unit: product.unit.clone(),
            quantity,
            added_at: now,
            updated_at: now,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns unit price × quantity in the base currency.
    ///
    /// ## Errors
    /// `CoreError::TotalOverflow` when the product does not fit in i64 cents.
    #[inline]
    pub fn line_total(&self) -> CoreResult<Money> {
        self.unit_price()
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| CoreError::TotalOverflow {
                item: self.id.clone(),
            })
    }
}

// =============================================================================
// Remote Feed Records
// =============================================================================

/// A price as it appears in the catalog feed.
///
/// Depending on the feed variant the price is a JSON number (`1.5`) or a
/// numeric string (`"1.50"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedPrice {
    Number(f64),
    Text(String),
}

impl FeedPrice {
    /// Converts the feed price into cents.
    pub fn to_money(&self) -> Result<Money, ValidationError> {
        match self {
            FeedPrice::Number(amount) => Money::from_major(*amount),
            FeedPrice::Text(text) => Money::parse_decimal(text),
        }
    }
}

/// One record of the remote catalog feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub id: String,
    pub title: String,
    pub price: FeedPrice,
    #[serde(default)]
    pub unit: String,
}

impl RemoteProduct {
    /// Validates the record and turns it into a catalog product.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use shopy_core::types::{FeedPrice, RemoteProduct};
    ///
    /// let record = RemoteProduct {
    ///     id: "eggs".into(),
    ///     title: "Eggs".into(),
    ///     price: FeedPrice::Text("1.50".into()),
    ///     unit: "dozen".into(),
    /// };
    /// let product = record.into_product(Utc::now()).unwrap();
    /// assert_eq!(product.unit_price_cents, 150);
    /// ```
    pub fn into_product(self, synced_at: DateTime<Utc>) -> Result<Product, ValidationError> {
        validate_product_id(&self.id)?;
        validate_title(&self.title)?;
        validate_unit(&self.unit)?;
        let price = self.price.to_money()?;
        validate_price_cents(price.cents())?;

        Ok(Product {
            id: self.id.trim().to_string(),
            title: self.title.trim().to_string(),
            unit_price_cents: price.cents(),
            unit: self.unit.trim().to_string(),
            synced_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Product {id}"),
            unit_price_cents: cents,
            unit: "kg".to_string(),
            synced_at: Utc::now(),
        }
    }

    #[test]
    fn test_basket_line_snapshots_product() {
        let p = product("beans", 73);
        let line = BasketLine::from_product(&p, 3, Utc::now());

        assert_eq!(line.id, "beans");
        assert_eq!(line.title, "Product beans");
        assert_eq!(line.unit, "kg");
        assert_eq!(line.unit_price_cents, 73);
        assert_eq!(line.line_total().unwrap().cents(), 219);
    }

    #[test]
    fn test_feed_price_accepts_number_and_string() {
        let records: Vec<RemoteProduct> = serde_json::from_str(
            r#"[
                {"id": "eggs", "title": "Eggs", "price": "1.50", "unit": "dozen"},
                {"id": "milk", "title": "Milk", "price": 2.0, "unit": "gal"}
            ]"#,
        )
        .unwrap();

        assert_eq!(records[0].price.to_money().unwrap().cents(), 150);
        assert_eq!(records[1].price.to_money().unwrap().cents(), 200);
    }

    #[test]
    fn test_remote_product_missing_unit_defaults_empty() {
        let record: RemoteProduct =
            serde_json::from_str(r#"{"id": "x", "title": "X", "price": 1}"#).unwrap();
        assert_eq!(record.unit, "");
        assert!(record.into_product(Utc::now()).is_ok());
    }

    #[test]
    fn test_remote_product_trims_fields() {
        let record = RemoteProduct {
            id: " milk ".to_string(),
            title: " Milk ".to_string(),
            price: FeedPrice::Number(2.0),
            unit: " gal".to_string(),
        };
        let p = record.into_product(Utc::now()).unwrap();
        assert_eq!(p.id, "milk");
        assert_eq!(p.title, "Milk");
        assert_eq!(p.unit, "gal");
    }

    #[test]
    fn test_remote_product_price_ceiling() {
        let record = |price: f64| RemoteProduct {
            id: "yacht".to_string(),
            title: "Yacht".to_string(),
            price: FeedPrice::Number(price),
            unit: String::new(),
        };

        let at_limit = record(10_000_000.0).into_product(Utc::now()).unwrap();
        assert_eq!(at_limit.unit_price_cents, crate::validation::MAX_PRICE_CENTS);

        assert!(matches!(
            record(10_000_000.01).into_product(Utc::now()),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            record(1e15).into_product(Utc::now()),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let line = BasketLine::from_product(&product("gold", i64::MAX / 2), 3, Utc::now());
        assert!(matches!(
            line.line_total(),
            Err(CoreError::TotalOverflow { ref item }) if item == "gold"
        ));
    }

    #[test]
    fn test_remote_product_rejects_invalid_price() {
        let record = RemoteProduct {
            id: "eggs".to_string(),
            title: "Eggs".to_string(),
            price: FeedPrice::Text("free".to_string()),
            unit: "dozen".to_string(),
        };
        assert!(record.into_product(Utc::now()).is_err());
    }
}
