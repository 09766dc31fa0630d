//! # Catalog Sources
//!
//! Where a catalog payload comes from, and how it is parsed.
//!
//! ## Payload Format
//! ```json
//! [
//!   { "id": "eggs",  "title": "Eggs",  "price": 1.50,   "unit": "dozen" },
//!   { "id": "milk",  "title": "Milk",  "price": "2.00", "unit": "gal" }
//! ]
//! ```
//! A `{"products": [...]}` envelope is accepted as well.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::FeedConfig;
use crate::error::{SyncError, SyncResult};
use crate::http::{Cancel, FeedClient};
use shopy_core::RemoteProduct;

// =============================================================================
// Source Trait
// =============================================================================

/// A place the catalog payload can be read from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable origin for logs and reports.
    fn describe(&self) -> String;

    /// Reads the raw payload.
    async fn fetch(&self, cancel: &Cancel) -> SyncResult<Vec<u8>>;
}

/// Catalog served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpCatalogFeed {
    url: Url,
    client: FeedClient,
}

impl HttpCatalogFeed {
    pub fn new(url: Url, client: FeedClient) -> Self {
        HttpCatalogFeed { url, client }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogFeed {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self, cancel: &Cancel) -> SyncResult<Vec<u8>> {
        self.client.get(&self.url, cancel).await
    }
}

/// Catalog bundled as a local JSON file.
#[derive(Debug, Clone)]
pub struct FileCatalogFeed {
    path: PathBuf,
}

impl FileCatalogFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCatalogFeed { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogFeed {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn fetch(&self, cancel: &Cancel) -> SyncResult<Vec<u8>> {
        cancel.check()?;
        debug!(path = %self.path.display(), "Reading catalog file");

        tokio::fs::read(&self.path).await.map_err(|e| {
            SyncError::Unreachable(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Builds the configured catalog source. A file takes precedence over a URL.
pub fn source_from_config(config: &FeedConfig) -> SyncResult<Box<dyn CatalogSource>> {
    if let Some(ref path) = config.catalog.file {
        return Ok(Box::new(FileCatalogFeed::new(path.clone())));
    }

    match config.catalog.url {
        Some(ref raw) => {
            let url = crate::config::parse_http_url(raw)?;
            let client = FeedClient::new(&config.http)?;
            Ok(Box::new(HttpCatalogFeed::new(url, client)))
        }
        None => Err(SyncError::MissingSource),
    }
}

// =============================================================================
// Parsing
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    List(Vec<RemoteProduct>),
    Envelope { products: Vec<RemoteProduct> },
}

/// Parses raw feed records without validating them.
///
/// Validation and duplicate collapsing happen in
/// `shopy_core::catalog::products_from_feed`.
pub fn parse_records(body: &[u8]) -> SyncResult<Vec<RemoteProduct>> {
    // Decode strictly first so the error message points at the real problem.
    match serde_json::from_slice::<Vec<RemoteProduct>>(body) {
        Ok(records) => Ok(records),
        Err(list_err) => match serde_json::from_slice::<Payload>(body) {
            Ok(Payload::List(records)) | Ok(Payload::Envelope { products: records }) => {
                Ok(records)
            }
            Err(_) => Err(SyncError::Malformed(list_err.to_string())),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
