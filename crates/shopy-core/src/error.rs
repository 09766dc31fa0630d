//! # Error Types
//!
//! Domain-specific error types for shopy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopy-core errors (this file)                                         │
//! │  ├── CoreError        - Basket rule violations                         │
//! │  └── ValidationError  - Input / feed record validation failures        │
//! │                                                                         │
//! │  shopy-db errors                                                        │
//! │  └── DbError          - Persistence failures                           │
//! │                                                                         │
//! │  shopy-sync errors                                                      │
//! │  ├── SyncError        - Catalog feed unreachable or malformed          │
//! │  └── RateLookupError  - Exchange-rate feed failures                    │
//! │                                                                         │
//! │  shopy-cli errors                                                       │
//! │  └── ApiError         - What the command line reports                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A basket line was requested for a catalog id with no matching product.
    ///
    /// ## When This Occurs
    /// - The product id was never synced
    /// - The product was removed by a later catalog sync
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line or basket total does not fit in 64-bit cents.
    #[error("Total for {item} is too large to compute")]
    TotalOverflow { item: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised for user input and for records arriving from the catalog feed.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value outside the allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unparsable price, malformed currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
