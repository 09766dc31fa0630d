//! # Catalog Commands
//!
//! Pulling the remote catalog and listing what can be bought.

use std::path::PathBuf;

use shopy_core::Product;
use shopy_sync::{source_from_config, CatalogSource, CatalogSync, FileCatalogFeed, SyncReport};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// Replaces the local catalog with the remote one.
///
/// ## Arguments
/// * `file` - Read this JSON file instead of the configured source
///
/// ## Errors
/// A failed fetch or a rejected payload leaves the catalog as it was.
pub async fn sync_catalog(state: &AppState, file: Option<PathBuf>) -> ApiResult<SyncReport> {
    debug!(file = ?file, "sync_catalog command");

    let source: Box<dyn CatalogSource> = match file {
        Some(path) => Box::new(FileCatalogFeed::new(path)),
        None => source_from_config(&state.feed)?,
    };

    let report = CatalogSync::new(state.db.clone())
        .run(source.as_ref(), &state.cancel)
        .await?;

    Ok(report)
}

/// Lists the catalog, sorted by title.
pub async fn list_products(state: &AppState) -> ApiResult<Vec<Product>> {
    debug!("list_products command");
    Ok(state.db.catalog().list_by_title().await?)
}
