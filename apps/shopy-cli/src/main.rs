//! # shopy
//!
//! Command-line shop: sync the catalog, fill the basket, check out.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging to stderr)
//! 2. Resolve configuration (flags, `SHOPY_*` environment, platform dirs)
//! 3. Open the database & run migrations
//! 4. Build `AppState` (rate feed, currency state, notifier)
//! 5. Run the subcommand, cancelling it on Ctrl+C
//!
//! ## Examples
//! ```text
//! shopy sync --file fixtures/products.json
//! shopy add eggs && shopy add eggs && shopy add milk
//! shopy checkout --currency EUR
//! shopy order --json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use shopy_cli::commands::{basket, catalog, checkout};
use shopy_cli::{init_tracing, output, ApiError, ApiResult, AppConfig, AppState};

#[derive(Debug, Parser)]
#[command(name = "shopy", version, about = "Shop, basket and checkout")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Database file (overrides SHOPY_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Feed configuration file (overrides SHOPY_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the local catalog with the remote one
    Sync {
        /// Read the catalog from a JSON file instead of the configured feed
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List the catalog
    Products,
    /// Show the basket
    Basket,
    /// Set the quantity of a product (0 removes it)
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Add one unit of a product
    Add { id: String },
    /// Remove one unit of a product
    Remove { id: String },
    /// Empty the basket
    Clear,
    /// Show the checkout total
    Checkout {
        #[arg(long, value_name = "CODE")]
        currency: Option<String>,
    },
    /// Place the order and empty the basket
    Order {
        #[arg(long, value_name = "CODE")]
        currency: Option<String>,
    },
    /// List the currencies offered at checkout
    Currencies,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        if json {
            let body = serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.message.clone());
            eprintln!("{}", body);
        } else {
            eprintln!("error: {}", err.message);
        }
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> ApiResult<()> {
    let config = AppConfig::resolve(cli.db, cli.config)?.with_json_output(cli.json);
    let state = AppState::open(&config).await?;

    tokio::spawn(cancel_on_ctrl_c(state.cancel.clone()));

    let result = dispatch(&state, cli.command, config.json_output).await;
    state.db.close().await;
    result
}

async fn dispatch(state: &AppState, command: Command, json: bool) -> ApiResult<()> {
    match command {
        Command::Sync { file } => {
            let report = catalog::sync_catalog(state, file).await?;
            emit(json, &report, output::render_sync)
        }
        Command::Products => {
            let products = catalog::list_products(state).await?;
            emit(json, &products, |p| output::render_products(p))
        }
        Command::Basket => {
            let summary = basket::get_basket(state).await?;
            emit(json, &summary, output::render_basket)
        }
        Command::Set { id, quantity } => {
            let update = basket::set_quantity(state, &id, quantity).await?;
            emit(json, &update, |u| {
                output::render_change(&u.change) + &output::render_basket(&u.summary)
            })
        }
        Command::Add { id } => {
            let update = basket::increment(state, &id).await?;
            emit(json, &update, |u| {
                output::render_change(&u.change) + &output::render_basket(&u.summary)
            })
        }
        Command::Remove { id } => {
            let update = basket::decrement(state, &id).await?;
            emit(json, &update, |u| {
                output::render_change(&u.change) + &output::render_basket(&u.summary)
            })
        }
        Command::Clear => {
            let summary = basket::clear_basket(state).await?;
            emit(json, &summary, output::render_basket)
        }
        Command::Checkout { currency } => {
            let view = checkout::checkout(state, currency.as_deref()).await?;
            if let Some(ref notice) = view.notice {
                warn!(notice = %notice, "Checkout currency fell back to USD");
            }
            emit(json, &view, output::render_checkout)
        }
        Command::Order { currency } => {
            let receipt = checkout::place_order(state, currency.as_deref()).await?;
            emit(json, &receipt, output::render_order)
        }
        Command::Currencies => {
            let codes = checkout::list_currencies();
            emit(json, &codes, |c| c.join("\n") + "\n")
        }
    }
}

/// Prints `value` as JSON or through its text renderer.
fn emit<T, F>(json: bool, value: &T, render: F) -> ApiResult<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| ApiError::internal(format!("Failed to encode output: {}", e)))?;
        println!("{}", body);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

/// Cancels in-flight feed requests on Ctrl+C.
async fn cancel_on_ctrl_c(cancel: shopy_sync::Cancel) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, cancelling");
        cancel.cancel();
    }
}
