//! # Sync Error Types
//!
//! Error types for catalog sync and exchange-rate lookups.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Payload             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unreachable    │  │  Malformed              │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  InvalidRecord          │ │
//! │  │  MissingSource  │  │  HttpStatus     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Database     │  │     Control     │                              │
//! │  │                 │  │                 │                              │
//! │  │  Database       │  │  Cancelled      │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! │                                                                         │
//! │  RateLookupError: every variant makes currency selection fall back     │
//! │  to USD / 1.0.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use shopy_core::catalog::RecordError;
use shopy_db::DbError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Catalog sync and feed transport errors.
///
/// A sync that fails with any of these leaves the catalog store as it was.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid feed configuration.
    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),

    /// Invalid feed URL.
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    /// Neither a catalog URL nor a catalog file is configured.
    #[error("No catalog source configured (set catalog.url or catalog.file)")]
    MissingSource,

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The feed could not be reached (DNS, connect, I/O, unreadable file).
    #[error("Feed unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete in time.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The feed answered with a non-success status.
    #[error("Feed returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// The payload is not a JSON list of product records.
    #[error("Malformed catalog payload: {0}")]
    Malformed(String),

    /// A record in the payload failed validation.
    #[error("Malformed catalog payload: {0}")]
    InvalidRecord(#[from] RecordError),

    // =========================================================================
    // Control
    // =========================================================================
    /// The operation was cancelled before it changed anything.
    #[error("Sync cancelled")]
    Cancelled,

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Writing the catalog failed; the transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Malformed(err.to_string())
        } else {
            SyncError::Unreachable(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SyncError {
    /// Returns true if the request can be retried.
    ///
    /// ## Retryable Errors
    /// - Connection failures
    /// - Timeouts
    /// - HTTP 5xx and 429
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Unreachable(_) | SyncError::Timeout(_) => true,
            SyncError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::MissingSource
                | SyncError::ConfigLoadFailed(_)
        )
    }
}

// =============================================================================
// Rate Lookup Errors
// =============================================================================

/// Exchange-rate lookup failures.
///
/// None of these are fatal: the currency selection falls back to USD / 1.0
/// and the error is reported as a notice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateLookupError {
    /// The rate feed could not be reached or timed out.
    #[error("Exchange rate service unreachable: {0}")]
    Unreachable(String),

    /// The response has no quote for the requested pair.
    #[error("No exchange rate quote for {0}")]
    MissingQuote(String),

    /// The quote is zero, negative or not a finite number.
    #[error("Invalid exchange rate {rate} for {pair}")]
    InvalidRate { pair: String, rate: f64 },

    /// The response is not the expected JSON shape.
    #[error("Malformed exchange rate response: {0}")]
    Malformed(String),

    /// The service reported an error in its response body.
    #[error("Exchange rate service error: {0}")]
    Service(String),

    /// The source has no rate for this currency at all.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

impl From<SyncError> for RateLookupError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Malformed(msg) => RateLookupError::Malformed(msg),
            other => RateLookupError::Unreachable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Unreachable("connection refused".into()).is_retryable());
        assert!(SyncError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(SyncError::HttpStatus {
            status: 503,
            url: "http://feed".into()
        }
        .is_retryable());

        assert!(!SyncError::HttpStatus {
            status: 404,
            url: "http://feed".into()
        }
        .is_retryable());
        assert!(!SyncError::Malformed("eof".into()).is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        assert!(SyncError::MissingSource.is_config_error());
        assert!(SyncError::ConfigLoadFailed("bad toml".into()).is_config_error());
        assert!(!SyncError::Malformed("x".into()).is_config_error());
    }

    #[test]
    fn test_timeout_display() {
        let err = SyncError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");
    }

    #[test]
    fn test_rate_error_from_transport() {
        let err = RateLookupError::from(SyncError::Cancelled);
        assert!(matches!(err, RateLookupError::Unreachable(_)));
    }
}
