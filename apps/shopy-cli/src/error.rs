//! # API Error Type
//!
//! Unified error type for shopy commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopy                                  │
//! │                                                                         │
//! │  Command Function  ──►  Result<T, ApiError>                            │
//! │         │                                                               │
//! │         ├── DbError        (hard)  ── DATABASE_ERROR / NOT_FOUND       │
//! │         ├── CoreError      (hard)  ── NOT_FOUND / VALIDATION_ERROR     │
//! │         └── SyncError      (notice)── FEED_ERROR / CONFIG_ERROR        │
//! │                                                                         │
//! │  Notices never abort a command that can continue: a failed sync keeps  │
//! │  the last good catalog, a failed rate lookup reverts to USD / 1.0 and  │
//! │  is only logged.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the error is printed as:
//! ```json
//! { "code": "NOT_FOUND", "message": "Product not found: eggs" }
//! ```

use serde::Serialize;
use shopy_core::CoreError;
use shopy_db::DbError;
use shopy_sync::SyncError;

/// Error returned from shopy commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Catalog feed unreachable, timed out, or sent a bad payload
    FeedError,

    /// Feed or application configuration is invalid
    ConfigError,

    /// The operation was cancelled
    Cancelled,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ConfigError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::NotFound | ErrorCode::ValidationError => 2,
            ErrorCode::ConfigError => 3,
            ErrorCode::FeedError => 4,
            ErrorCode::Cancelled => 130,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(core) => ApiError::from(core),
            DbError::ConstraintViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value rejected by the store")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::QuantityTooLarge { requested, max } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Quantity {} exceeds maximum allowed ({})", requested, max),
            ),
            err @ CoreError::TotalOverflow { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts sync errors to API errors.
impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Database(db) => ApiError::from(db),
            SyncError::Cancelled => ApiError::new(ErrorCode::Cancelled, "Sync cancelled"),
            err if err.is_config_error() => ApiError::config(err.to_string()),
            err => ApiError::new(ErrorCode::FeedError, err.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type alias for commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_not_found_maps_to_not_found() {
        let err = ApiError::from(DbError::Rejected(CoreError::ProductNotFound("eggs".into())));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: eggs");
    }

    #[test]
    fn test_sync_errors() {
        let err = ApiError::from(SyncError::Unreachable("connection refused".into()));
        assert_eq!(err.code, ErrorCode::FeedError);

        let err = ApiError::from(SyncError::MissingSource);
        assert_eq!(err.code, ErrorCode::ConfigError);
        assert_eq!(err.exit_code(), 3);

        let err = ApiError::from(SyncError::Cancelled);
        assert_eq!(err.code, ErrorCode::Cancelled);
    }

    #[test]
    fn test_store_errors_hide_details() {
        let err = ApiError::from(DbError::ConstraintViolation {
            message: "CHECK constraint failed: unit_price_cents >= 0".into(),
        });
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Value rejected by the store");

        let err = ApiError::from(DbError::PoolExhausted);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_total_overflow_is_a_validation_error() {
        let err = ApiError::from(DbError::Rejected(CoreError::TotalOverflow {
            item: "basket".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_serializes_screaming_snake_code() {
        let err = ApiError::from(SyncError::Unreachable("connection refused".into()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "FEED_ERROR");
        assert!(json["message"].as_str().unwrap().contains("connection refused"));
    }
}
