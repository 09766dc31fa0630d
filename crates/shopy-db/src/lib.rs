//! # shopy-db: Database Layer for Shopy
//!
//! This crate provides database access for Shopy.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopy Data Flow                                  │
//! │                                                                         │
//! │  Command (set eggs 2)            Sync Engine (catalog feed)            │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     shopy-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ CatalogRepo    │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ BasketRepo     │    │              │  │   │
//! │  │   │ write locks   │    │                │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/shopy/shopy.db                                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog and basket repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopy_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/shopy.db")).await?;
//!
//! let products = db.catalog().list_by_title().await?;
//! let change = db.basket().set_quantity("eggs", 2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::basket::BasketRepository;
pub use repository::catalog::{CatalogRepository, ReplaceSummary};
