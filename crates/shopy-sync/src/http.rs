//! # Feed HTTP Client
//!
//! GET requests with a per-request timeout, bounded exponential backoff for
//! transient failures, and cooperative cancellation.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get(url, cancel)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────┐   ok (2xx)                                                │
//! │  │ attempt  │ ─────────────────────────────────────────► body bytes     │
//! │  └────┬─────┘                                                           │
//! │       │ Unreachable / Timeout / 5xx / 429                               │
//! │       ▼                                                                 │
//! │  retries left? ── no ──────────────────────────────────► last error     │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  sleep(next backoff)  ◄── cancel.cancel() ─────────────► Cancelled      │
//! │       │                                                                 │
//! │       └──► attempt again                                                │
//! │                                                                         │
//! │  4xx and malformed responses are never retried.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::config::HttpSettings;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// Cancellation
// =============================================================================

/// A cancellation handle shared between a caller and in-flight fetches.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct Cancel {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancel {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Cancel {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Requests cancellation of every operation holding this handle.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`Cancel::cancel`] has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as any handle, so this only ends on cancel.
        let closed = rx.wait_for(|cancelled| *cancelled).await.map(|_| ()).is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Returns `Err(Cancelled)` if cancellation was requested.
    pub fn check(&self) -> SyncResult<()> {
        if self.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Feed Client
// =============================================================================

/// HTTP client shared by the catalog feed and the rate feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl FeedClient {
    /// Creates a client from HTTP settings.
    pub fn new(settings: &HttpSettings) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.timeout())
            .user_agent(concat!("shopy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        Ok(FeedClient {
            client,
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            initial_backoff: settings.initial_backoff(),
            max_backoff: settings.max_backoff(),
        })
    }

    /// Fetches `url` and returns the response body.
    ///
    /// ## Errors
    /// * `SyncError::Cancelled` - `cancel` fired before a response arrived
    /// * `SyncError::Timeout` - the last attempt exceeded the timeout
    /// * `SyncError::HttpStatus` - non-2xx response
    /// * `SyncError::Unreachable` - connection or I/O failure
    pub async fn get(&self, url: &Url, cancel: &Cancel) -> SyncResult<Vec<u8>> {
        let mut backoff = self.create_backoff();
        let mut attempt = 0u32;

        loop {
            cancel.check()?;
            attempt += 1;

            let result = tokio::select! {
                result = self.attempt(url) => result,
                _ = cancel.cancelled() => {
                    debug!(url = %url, "Request cancelled");
                    return Err(SyncError::Cancelled);
                }
            };

            let err = match result {
                Ok(body) => {
                    debug!(url = %url, attempt, bytes = body.len(), "Feed request succeeded");
                    return Ok(body);
                }
                Err(err) => err,
            };

            if !err.is_retryable() || attempt > self.max_retries {
                warn!(url = %url, attempt, error = %err, "Feed request failed");
                return Err(err);
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(err);
            };

            debug!(url = %url, attempt, ?delay, error = %err, "Retrying feed request");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    debug!(url = %url, "Cancelled during backoff");
                    return Err(SyncError::Cancelled);
                }
            }
        }
    }

    /// One request, bounded by the timeout.
    async fn attempt(&self, url: &Url) -> SyncResult<Vec<u8>> {
        let request = async {
            let response = self.client.get(url.clone()).send().await?;

            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.bytes().await?;
            Ok(body.to_vec())
        };

        match timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(self.timeout)),
        }
    }

    /// Creates the exponential backoff configuration.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            // Attempts are bounded by max_retries instead.
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    pub(crate) async fn serve(router: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    pub(crate) fn fast_settings(max_retries: u32) -> HttpSettings {
        HttpSettings {
            timeout_secs: 2,
            max_retries,
            initial_backoff_ms: 10,
            max_backoff_secs: 1,
        }
    }

    async fn flaky(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, &'static str) {
        if hits.fetch_add(1, Ordering::SeqCst) < 2 {
            (StatusCode::SERVICE_UNAVAILABLE, "busy")
        } else {
            (StatusCode::OK, "[]")
        }
    }

    fn flaky_router(hits: Arc<AtomicUsize>) -> Router {
        Router::new().route("/feed", get(flaky)).with_state(hits)
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let base = serve(Router::new().route("/feed", get(|| async { "hello" }))).await;
        let client = FeedClient::new(&fast_settings(0)).unwrap();

        let body = client
            .get(&base.join("feed").unwrap(), &Cancel::new())
            .await
            .unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve(flaky_router(hits.clone())).await;
        let client = FeedClient::new(&fast_settings(3)).unwrap();

        let body = client
            .get(&base.join("feed").unwrap(), &Cancel::new())
            .await
            .unwrap();
        assert_eq!(body, b"[]");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve(flaky_router(hits.clone())).await;
        let client = FeedClient::new(&fast_settings(1)).unwrap();

        let err = client
            .get(&base.join("feed").unwrap(), &Cancel::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::HttpStatus { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let base = serve(Router::new()).await;
        let client = FeedClient::new(&fast_settings(3)).unwrap();

        let err = client
            .get(&base.join("missing").unwrap(), &Cancel::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = serve(router).await;

        let mut client = FeedClient::new(&fast_settings(0)).unwrap();
        client.timeout = Duration::from_millis(100);

        let err = client
            .get(&base.join("slow").unwrap(), &Cancel::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = serve(router).await;
        let client = FeedClient::new(&fast_settings(0)).unwrap();

        let cancel = Cancel::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = client
            .get(&base.join("slow").unwrap(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = serve(flaky_router(hits.clone())).await;
        let client = FeedClient::new(&fast_settings(0)).unwrap();

        let cancel = Cancel::new();
        cancel.cancel();

        let err = client
            .get(&base.join("feed").unwrap(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FeedClient::new(&fast_settings(0)).unwrap();
        let url = Url::parse(&format!("http://{}/feed", addr)).unwrap();

        let err = client.get(&url, &Cancel::new()).await.unwrap_err();
        assert!(matches!(err, SyncError::Unreachable(_)));
    }
}
