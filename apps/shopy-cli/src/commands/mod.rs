//! # Commands Module
//!
//! The operations behind the `shopy` subcommands, grouped by screen:
//!
//! - [`catalog`] - `sync`, `products` (Shop)
//! - [`basket`] - `basket`, `set`, `add`, `remove`, `clear` (Basket)
//! - [`checkout`] - `checkout`, `order`, `currencies` (Checkout)
//!
//! Each function takes `&AppState` and returns `Result<T, ApiError>`.

pub mod basket;
pub mod catalog;
pub mod checkout;
