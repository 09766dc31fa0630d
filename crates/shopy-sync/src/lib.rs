//! # shopy-sync: Remote Feeds for Shopy
//!
//! This crate owns every network operation: pulling the product catalog
//! into the local catalog store, and looking up USD exchange rates for the
//! checkout currency picker.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopy Feed Layer                                 │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  CatalogSync (engine.rs)                         │  │
//! │  │                                                                  │  │
//! │  │  fetch ──► parse ──► validate ──► replace_all (one transaction)  │  │
//! │  └───────────────┬──────────────────────────────────────────────────┘  │
//! │                  │                                                      │
//! │         ┌────────┴─────────┐                                            │
//! │         ▼                  ▼                                            │
//! │  ┌────────────────┐  ┌────────────────┐   ┌────────────────────────┐   │
//! │  │ CatalogSource  │  │  FeedClient    │   │  RateSource            │   │
//! │  │                │  │                │   │                        │   │
//! │  │ HttpCatalogFeed│─►│ GET + timeout  │◄──│ HttpRateFeed (apilayer)│   │
//! │  │ FileCatalogFeed│  │ backoff retry  │   │ StaticRates            │   │
//! │  │                │  │ Cancel handle  │   │                        │   │
//! │  └────────────────┘  └────────────────┘   └────────────────────────┘   │
//! │                                                                         │
//! │  CONFIG: shopy.toml + SHOPY_* environment overrides (config.rs)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`engine`] - `CatalogSync` and its lifecycle events
//! - [`catalog_feed`] - Catalog sources and payload parsing
//! - [`rates`] - Exchange rate sources
//! - [`http`] - Shared HTTP client and cancellation handle
//! - [`config`] - Feed configuration
//! - [`error`] - Sync and rate lookup error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopy_sync::{source_from_config, Cancel, CatalogSync, FeedConfig};
//!
//! let config = FeedConfig::load(None)?;
//! let source = source_from_config(&config)?;
//!
//! let report = CatalogSync::new(db).run(source.as_ref(), &Cancel::new()).await?;
//! println!("{} products ({} new)", report.total, report.inserted);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog_feed;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod rates;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog_feed::{source_from_config, CatalogSource, FileCatalogFeed, HttpCatalogFeed};
pub use config::FeedConfig;
pub use engine::{CatalogSync, NoOpEmitter, SyncEventEmitter, SyncReport};
pub use error::{RateLookupError, SyncError, SyncResult};
pub use http::{Cancel, FeedClient};
pub use rates::{HttpRateFeed, RateSource, StaticRates};
