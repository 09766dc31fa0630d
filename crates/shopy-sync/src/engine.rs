//! # Catalog Sync Engine
//!
//! Fetches a catalog payload and makes the local catalog equal to it.
//!
//! ## Sync Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CatalogSync::run                                 │
//! │                                                                         │
//! │  source.fetch(cancel) ──► bytes                                         │
//! │       │  Unreachable / Timeout / HttpStatus / Cancelled ──► abort       │
//! │       ▼                                                                 │
//! │  parse + validate   ──► Vec<Product> (ids unique, last wins)         │
//! │       │  Malformed / InvalidRecord ──────────────────────► abort       │
//! │       ▼                                                                 │
//! │  cancel.check()  ────────────────────────────────────────► abort       │
//! │       ▼                                                                 │
//! │  db.catalog().replace_all(products)  (one transaction)                  │
//! │       ▼                                                                 │
//! │  SyncReport { inserted, updated, deleted, total }                       │
//! │                                                                         │
//! │  Every abort leaves the catalog store untouched.                       │
//! │  The basket store is never read or written.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::catalog_feed::{parse_records, CatalogSource};
use crate::error::SyncResult;
use crate::http::Cancel;
use shopy_core::catalog::products_from_feed;
use shopy_core::Product;
use shopy_db::Database;

// =============================================================================
// Report
// =============================================================================

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Where the payload came from.
    pub source: String,
    /// Records in the payload, duplicates included.
    pub received: usize,
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Products in the catalog afterwards.
    pub total: usize,
    pub synced_at: DateTime<Utc>,
    pub duration_ms: u64,
}

// =============================================================================
// Event Emitter
// =============================================================================

/// Receives sync lifecycle events (progress output, UI refresh).
pub trait SyncEventEmitter: Send + Sync {
    /// A sync run started.
    fn emit_started(&self, source: &str);

    /// A sync run committed.
    fn emit_completed(&self, report: &SyncReport);

    /// A sync run failed; the catalog is unchanged.
    fn emit_failed(&self, source: &str, message: &str, retryable: bool);
}

/// No-op emitter for when events aren't needed.
pub struct NoOpEmitter;

impl SyncEventEmitter for NoOpEmitter {
    fn emit_started(&self, _source: &str) {}
    fn emit_completed(&self, _report: &SyncReport) {}
    fn emit_failed(&self, _source: &str, _message: &str, _retryable: bool) {}
}

// =============================================================================
// Catalog Sync
// =============================================================================

/// Merges remote catalog payloads into the catalog store.
#[derive(Clone)]
pub struct CatalogSync {
    db: Database,
    emitter: Arc<dyn SyncEventEmitter>,
}

impl CatalogSync {
    /// Creates a sync engine with no event emitter.
    pub fn new(db: Database) -> Self {
        Self::with_emitter(db, Arc::new(NoOpEmitter))
    }

    /// Creates a sync engine with a custom event emitter.
    pub fn with_emitter(db: Database, emitter: Arc<dyn SyncEventEmitter>) -> Self {
        CatalogSync { db, emitter }
    }

    /// Fetches from `source` and replaces the catalog with its contents.
    pub async fn run(&self, source: &dyn CatalogSource, cancel: &Cancel) -> SyncResult<SyncReport> {
        let origin = source.describe();
        let started = Instant::now();
        self.emitter.emit_started(&origin);
        info!(source = %origin, "Catalog sync started");

        let result = self.fetch_and_apply(source, cancel, started).await;
        self.finish(&origin, result)
    }

    async fn fetch_and_apply(
        &self,
        source: &dyn CatalogSource,
        cancel: &Cancel,
        started: Instant,
    ) -> SyncResult<SyncReport> {
        let body = source.fetch(cancel).await?;

        let synced_at = Utc::now();
        let records = parse_records(&body)?;
        let received = records.len();
        let products = products_from_feed(records, synced_at)?;

        cancel.check()?;

        self.commit(&source.describe(), received, products, synced_at, started)
            .await
    }

    async fn commit(
        &self,
        origin: &str,
        received: usize,
        products: Vec<Product>,
        synced_at: DateTime<Utc>,
        started: Instant,
    ) -> SyncResult<SyncReport> {
        let summary = self.db.catalog().replace_all(products).await?;

        Ok(SyncReport {
            source: origin.to_string(),
            received,
            inserted: summary.inserted,
            updated: summary.updated,
            deleted: summary.deleted,
            total: summary.total,
            synced_at,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn finish(&self, origin: &str, result: SyncResult<SyncReport>) -> SyncResult<SyncReport> {
        match &result {
            Ok(report) => {
                info!(
                    source = %origin,
                    inserted = report.inserted,
                    updated = report.updated,
                    deleted = report.deleted,
                    total = report.total,
                    duration_ms = report.duration_ms,
                    "Catalog sync completed"
                );
                self.emitter.emit_completed(report);
            }
            Err(err) => {
                error!(source = %origin, error = %err, "Catalog sync failed");
                self.emitter
                    .emit_failed(origin, &err.to_string(), err.is_retryable());
            }
        }
        result
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_feed::{FileCatalogFeed, HttpCatalogFeed};
    use crate::error::SyncError;
    use crate::http::tests::{fast_settings, serve};
    use crate::http::FeedClient;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use shopy_db::DbConfig;
    use std::sync::Mutex;

    const P1: &str = r#"[
        {"id": "eggs", "title": "Eggs", "price": 1.5, "unit": "dozen"},
        {"id": "milk", "title": "Milk", "price": 2.0, "unit": "gal"},
        {"id": "tea", "title": "Tea", "price": 3.2, "unit": "box"}
    ]"#;

    const P2: &str = r#"[
        {"id": "milk", "title": "Milk", "price": 2.1, "unit": "gal"},
        {"id": "beans", "title": "Beans", "price": "0.73", "unit": "lb"}
    ]"#;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SyncEventEmitter for Recorder {
        fn emit_started(&self, _source: &str) {
            self.events.lock().unwrap().push("started".into());
        }
        fn emit_completed(&self, report: &SyncReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("completed:{}", report.total));
        }
        fn emit_failed(&self, _source: &str, _message: &str, retryable: bool) {
            self.events
                .lock()
                .unwrap()
                .push(format!("failed:{}", retryable));
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn write_feed(dir: &tempfile::TempDir, name: &str, body: &str) -> FileCatalogFeed {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        FileCatalogFeed::new(path)
    }

    async fn product(db: &Database, id: &str) -> Option<Product> {
        db.catalog()
            .list_by_title()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.id == id)
    }

    async fn sorted_ids(db: &Database) -> Vec<String> {
        let mut ids: Vec<String> = db
            .catalog()
            .list_by_title()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_second_sync_replaces_first() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());
        let cancel = Cancel::new();

        let first = sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();
        assert_eq!(first.inserted, 3);

        let second = sync.run(&write_feed(&dir, "p2.json", P2), &cancel).await.unwrap();
        assert_eq!(second.inserted, 1);
        assert_eq!(second.updated, 1);
        assert_eq!(second.deleted, 2);
        assert_eq!(second.total, 2);

        assert_eq!(sorted_ids(&db).await, vec!["beans", "milk"]);
        let milk = product(&db, "milk").await.unwrap();
        assert_eq!(milk.unit_price_cents, 210);
    }

    #[tokio::test]
    async fn test_malformed_payload_leaves_catalog_unchanged() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());
        let cancel = Cancel::new();

        sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();

        let err = sync
            .run(&write_feed(&dir, "bad.json", "[{\"id\": 1"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Malformed(_)));

        let err = sync
            .run(
                &write_feed(&dir, "neg.json", r#"[{"id": "x", "title": "X", "price": -2}]"#),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidRecord(_)));

        assert_eq!(sorted_ids(&db).await, vec!["eggs", "milk", "tea"]);
    }

    #[tokio::test]
    async fn test_unreachable_feed_leaves_catalog_unchanged() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());
        let cancel = Cancel::new();

        sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();

        let base = serve(Router::new().route(
            "/products",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        ))
        .await;
        let feed = HttpCatalogFeed::new(
            base.join("products").unwrap(),
            FeedClient::new(&fast_settings(1)).unwrap(),
        );

        let err = sync.run(&feed, &cancel).await.unwrap_err();
        assert!(matches!(err, SyncError::HttpStatus { status: 500, .. }));
        assert_eq!(sorted_ids(&db).await, vec!["eggs", "milk", "tea"]);
    }

    #[tokio::test]
    async fn test_cancelled_sync_changes_nothing() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());

        let cancel = Cancel::new();
        cancel.cancel();

        let err = sync
            .run(&write_feed(&dir, "p1.json", P1), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert!(sorted_ids(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_sync_over_http() {
        let db = db().await;
        let base = serve(Router::new().route("/products", get(|| async { P2 }))).await;
        let feed = HttpCatalogFeed::new(
            base.join("products").unwrap(),
            FeedClient::new(&fast_settings(0)).unwrap(),
        );

        let report = CatalogSync::new(db.clone())
            .run(&feed, &Cancel::new())
            .await
            .unwrap();
        assert_eq!(report.received, 2);
        assert_eq!(report.total, 2);
        assert!(report.source.ends_with("/products"));
    }

    #[tokio::test]
    async fn test_duplicate_ids_last_wins() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let feed = write_feed(
            &dir,
            "dupes.json",
            r#"[
                {"id": "eggs", "title": "Eggs", "price": 1.5, "unit": "dozen"},
                {"id": "eggs", "title": "Brown Eggs", "price": 1.8, "unit": "dozen"}
            ]"#,
        );

        let report = CatalogSync::new(db.clone())
            .run(&feed, &Cancel::new())
            .await
            .unwrap();
        assert_eq!(report.received, 2);
        assert_eq!(report.total, 1);

        let eggs = product(&db, "eggs").await.unwrap();
        assert_eq!(eggs.title, "Brown Eggs");
        assert_eq!(eggs.unit_price_cents, 180);
    }

    #[tokio::test]
    async fn test_overpriced_record_rejects_payload() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());
        let cancel = Cancel::new();

        sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();

        let err = sync
            .run(
                &write_feed(
                    &dir,
                    "dear.json",
                    r#"[{"id": "gold", "title": "Gold", "price": 1e15, "unit": "bar"}]"#,
                ),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidRecord(_)));
        assert_eq!(sorted_ids(&db).await, vec!["eggs", "milk", "tea"]);
    }

    #[tokio::test]
    async fn test_sync_does_not_touch_basket() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let sync = CatalogSync::new(db.clone());
        let cancel = Cancel::new();

        sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();
        db.basket().set_quantity("eggs", 2).await.unwrap();

        sync.run(&write_feed(&dir, "p2.json", P2), &cancel).await.unwrap();

        let lines = db.basket().list_by_title().await.unwrap();
        let line = lines.iter().find(|l| l.id == "eggs").unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price_cents, 150);
    }

    #[tokio::test]
    async fn test_events_are_emitted() {
        let db = db().await;
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let sync = CatalogSync::with_emitter(db, recorder.clone());
        let cancel = Cancel::new();

        sync.run(&write_feed(&dir, "p1.json", P1), &cancel).await.unwrap();
        let _ = sync.run(&write_feed(&dir, "bad.json", "{"), &cancel).await;

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["started", "completed:3", "started", "failed:false"]
        );
    }
}
