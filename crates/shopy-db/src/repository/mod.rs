//! # Repository Module
//!
//! Database repository implementations for Shopy.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command / Sync Engine                                                 │
//! │       │                                                                 │
//! │       │  db.basket().set_quantity("eggs", 2)                           │
//! │       ▼                                                                 │
//! │  BasketRepository                     CatalogRepository               │
//! │  ├── list_by_title()                  ├── list_by_title()             │
//! │  ├── set_quantity(id, qty)            └── replace_all(products)       │
//! │  ├── step(id, ±1)                                                      │
//! │  └── clear()                                                           │
//! │       │                                                                 │
//! │       │  SQL Query (inside the store's write lock for writes)          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Product listing and full replace
//! - [`basket::BasketRepository`] - Basket line mutation and listing

pub mod basket;
pub mod catalog;
