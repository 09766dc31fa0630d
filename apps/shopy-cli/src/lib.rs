//! # Shopy CLI Library
//!
//! Application layer of the `shopy` binary: state, commands, the basket
//! notifier and output rendering.
//!
//! ## Module Organization
//! ```text
//! shopy_cli/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── main.rs         ◄─── clap parsing, dispatch
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── config.rs   ◄─── AppConfig (database path, feed config file)
//! │   └── currency.rs ◄─── CurrencyState (selected currency + rate)
//! ├── commands/
//! │   ├── catalog.rs  ◄─── sync, products
//! │   ├── basket.rs   ◄─── basket, set, add, remove, clear
//! │   └── checkout.rs ◄─── checkout, order, currencies
//! ├── notifier.rs     ◄─── Badge/total aggregate on a watch channel
//! ├── output.rs       ◄─── Plain-text rendering
//! └── error.rs        ◄─── ApiError for commands
//! ```

pub mod commands;
pub mod error;
pub mod notifier;
pub mod output;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use notifier::AggregateNotifier;
pub use state::{AppConfig, AppState, CurrencyState};

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,shopy=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopy_sync=trace` - Show trace for the feed layer only
/// - Default: `info,shopy=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
