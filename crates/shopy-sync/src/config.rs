//! # Feed Configuration
//!
//! Where the catalog and exchange rates come from, and how hard to try.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPY_CATALOG_URL=https://shop.example/products.json               │
//! │     SHOPY_RATES_ACCESS_KEY=...                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopy/shopy.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.shopy.shopy/shopy.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [catalog]
//! url = "https://shop.example/products.json"
//! # file = "fixtures/products.json"
//!
//! [rates]
//! url = "http://apilayer.net/api/live"
//! access_key = "your-key"
//!
//! [http]
//! timeout_secs = 10
//! max_retries = 3
//! initial_backoff_ms = 250
//! max_backoff_secs = 5
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where the product catalog is fetched from.
///
/// A configured file takes precedence over the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    /// HTTP(S) URL returning a JSON array of products.
    #[serde(default)]
    pub url: Option<String>,

    /// Local JSON file with the same shape (bundled catalog).
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// =============================================================================
// Rate Settings
// =============================================================================

/// Exchange-rate service settings (apilayer "live" endpoint format).
#[derive(Debug, Clone, Deserialize)]
pub struct RateSettings {
    /// Endpoint URL; query parameters are appended per request.
    #[serde(default = "default_rates_url")]
    pub url: String,

    /// API access key, sent as `access_key`.
    #[serde(default)]
    pub access_key: Option<String>,
}

fn default_rates_url() -> String {
    "http://apilayer.net/api/live".to_string()
}

impl Default for RateSettings {
    fn default() -> Self {
        RateSettings {
            url: default_rates_url(),
            access_key: None,
        }
    }
}

// =============================================================================
// HTTP Settings
// =============================================================================

/// Timeout and retry behavior shared by both feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    /// 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff duration (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    250
}
fn default_max_backoff() -> u64 {
    5
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

// =============================================================================
// Main Feed Configuration
// =============================================================================

/// Complete feed configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedConfig {
    /// Catalog source.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Exchange-rate service.
    #[serde(default)]
    pub rates: RateSettings,

    /// Timeouts and retries.
    #[serde(default)]
    pub http: HttpSettings,
}

impl FeedConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (shopy.toml)
    /// 3. Environment variables
    ///
    /// A missing file is not an error. A file that does not parse, or an
    /// override that fails validation, is.
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Loads configuration with an explicit override lookup.
    pub fn load_with(
        config_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading feed config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(ref url) = self.catalog.url {
            parse_http_url(url)?;
        }

        parse_http_url(&self.rates.url)?;

        if self.http.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.http.initial_backoff_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "initial_backoff_ms must be greater than 0".into(),
            ));
        }

        if self.http.max_backoff() < self.http.initial_backoff() {
            return Err(SyncError::InvalidConfig(
                "max_backoff_secs must not be shorter than initial_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHOPY_*` overrides from a key lookup (the environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHOPY_CATALOG_URL") {
            debug!(url = %url, "Overriding catalog URL from environment");
            self.catalog.url = Some(url);
        }

        if let Some(file) = lookup("SHOPY_CATALOG_FILE") {
            debug!(file = %file, "Overriding catalog file from environment");
            self.catalog.file = Some(PathBuf::from(file));
        }

        if let Some(url) = lookup("SHOPY_RATES_URL") {
            self.rates.url = url;
        }

        if let Some(key) = lookup("SHOPY_RATES_ACCESS_KEY") {
            self.rates.access_key = Some(key);
        }

        if let Some(timeout) = lookup("SHOPY_HTTP_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.http.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring invalid SHOPY_HTTP_TIMEOUT_SECS"),
            }
        }

        if let Some(retries) = lookup("SHOPY_HTTP_MAX_RETRIES") {
            match retries.parse::<u32>() {
                Ok(r) => self.http.max_retries = r,
                Err(_) => warn!(value = %retries, "Ignoring invalid SHOPY_HTTP_MAX_RETRIES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopy", "shopy")
            .map(|dirs| dirs.config_dir().join("shopy.toml"))
    }
}

/// Parses a URL and requires the http or https scheme.
pub fn parse_http_url(raw: &str) -> SyncResult<Url> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SyncError::InvalidUrl(format!(
            "Feed URL must use http:// or https://, got {}://",
            other
        ))),
    }
}
