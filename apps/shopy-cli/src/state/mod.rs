//! # State Module
//!
//! Application state shared by every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            AppState                                     │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │    Database      │ │  CurrencyState   │ │  AggregateNotifier   │    │
//! │  │                  │ │                  │ │                      │    │
//! │  │  • catalog store │ │  • currency code │ │  • latest summary    │    │
//! │  │  • basket store  │ │  • USD rate      │ │  • watch receivers   │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │   RateSource     │ │   FeedConfig     │ │   Cancel             │    │
//! │  │  (apilayer feed) │ │  (catalog source)│ │  (Ctrl+C)            │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod currency;

pub use config::{AppConfig, DB_FILE_NAME};
pub use currency::CurrencyState;

use std::sync::Arc;

use shopy_db::migrations::migration_status;
use shopy_db::{Database, DbConfig};
use shopy_sync::{Cancel, FeedConfig, HttpRateFeed, RateSource};
use tracing::info;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::notifier::AggregateNotifier;

/// Everything a command needs, constructed once per process.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub rates: Arc<dyn RateSource>,
    pub feed: FeedConfig,
    pub currency: CurrencyState,
    pub notifier: AggregateNotifier,
    pub cancel: Cancel,
}

impl AppState {
    /// Wires the state around an open database.
    pub fn new(db: Database, rates: Arc<dyn RateSource>, feed: FeedConfig) -> Self {
        AppState {
            db,
            rates,
            feed,
            currency: CurrencyState::new(),
            notifier: AggregateNotifier::new(),
            cancel: Cancel::new(),
        }
    }

    /// Opens the database and the rate feed described by `config`.
    pub async fn open(config: &AppConfig) -> ApiResult<Self> {
        config.ensure_data_dir()?;

        let db = Database::new(DbConfig::new(config.database_path.clone())).await?;
        if !db.health_check().await {
            return Err(ApiError::new(
                ErrorCode::DatabaseError,
                format!("Database not usable: {}", config.database_path.display()),
            ));
        }

        let (total, applied) = migration_status(db.pool()).await?;
        info!(
            path = %config.database_path.display(),
            migrations = total,
            applied,
            "Database opened"
        );

        let feed = config.feed_config()?;
        let rates = HttpRateFeed::from_config(&feed)?;

        Ok(AppState::new(db, Arc::new(rates), feed))
    }
}
