//! # shopy-core: Pure Business Logic for Shopy
//!
//! This crate holds the rules of the shop as pure functions with zero I/O
//! dependencies: how a remote catalog is merged into local storage, how a
//! basket quantity change is resolved, how totals are priced and converted.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopy Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    shopy (CLI front end)                        │   │
//! │  │        Shop ──► Basket ──► Checkout ──► Order                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopy-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ basket  │ │ pricing │ │currency │  │   │
//! │  │   │ Product │ │  Money  │ │ Change  │ │ totals  │ │ context │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                │                                  │                     │
//! │  ┌─────────────▼──────────────┐   ┌───────────────▼─────────────────┐  │
//! │  │  shopy-db (SQLite stores)  │   │  shopy-sync (catalog & rates)   │  │
//! │  └────────────────────────────┘   └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, BasketLine, RemoteProduct)
//! - [`money`] - Money type with integer arithmetic
//! - [`basket`] - Basket quantity rules (insert / update / remove)
//! - [`catalog`] - Catalog merge planning (upsert + full-replace delete)
//! - [`pricing`] - Line and basket totals, display formatting
//! - [`currency`] - Exchange context and the currency selection state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use shopy_core::{BasketLine, BasketSummary, ExchangeContext};
//!
//! let now = Utc::now();
//! let line = |id: &str, cents: i64, quantity: i64| BasketLine {
//!     id: id.into(),
//!     title: id.into(),
//!     unit_price_cents: cents,
//!     unit: String::new(),
//!     quantity,
//!     added_at: now,
//!     updated_at: now,
//! };
//!
//! let basket = [line("eggs", 150, 2), line("milk", 250, 1), line("beans", 73, 1)];
//! let summary = BasketSummary::compute(&basket, &ExchangeContext::base()).unwrap();
//! assert_eq!(summary.total_label, "Total Price: USD 6.23");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod catalog;
pub mod currency;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::{resolve_quantity_change, BasketChange};
pub use catalog::{plan_catalog_merge, CatalogMerge};
pub use currency::{CurrencyCode, CurrencyTransition, ExchangeContext};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{basket_total, line_total, BasketSummary, LineSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency every catalog price is denominated in.
pub const BASE_CURRENCY: &str = "USD";

/// Currencies offered by the checkout currency picker.
pub const SUPPORTED_CURRENCIES: [&str; 5] = ["USD", "EUR", "CHF", "GBP", "BOB"];

/// Maximum quantity of a single basket line.
///
/// Matches the 16-bit item count the basket was originally stored with.
pub const MAX_ITEM_QUANTITY: i64 = i16::MAX as i64;
