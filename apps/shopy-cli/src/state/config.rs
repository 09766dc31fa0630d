//! # Application Configuration
//!
//! Where the database lives and which feed configuration file to load.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`, `--config`)
//! 2. Environment variables (`SHOPY_DB_PATH`, `SHOPY_CONFIG`)
//! 3. Platform defaults (this file)
//!
//! ## Default Database Path
//! - **macOS**: `~/Library/Application Support/com.shopy.shopy/shopy.db`
//! - **Windows**: `%APPDATA%\shopy\shopy\data\shopy.db`
//! - **Linux**: `~/.local/share/shopy/shopy.db`

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Serialize;
use shopy_sync::FeedConfig;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "shopy.db";

/// Application configuration resolved at startup.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Feed configuration file (`None` = platform default location).
    pub feed_config_path: Option<PathBuf>,

    /// Print command results as JSON.
    pub json_output: bool,
}

impl AppConfig {
    /// Resolves the configuration from flags and the process environment.
    pub fn resolve(db_flag: Option<PathBuf>, config_flag: Option<PathBuf>) -> ApiResult<Self> {
        Self::resolve_with(db_flag, config_flag, |key| std::env::var(key).ok())
    }

    /// Resolves the configuration with an explicit environment lookup.
    pub fn resolve_with<F>(
        db_flag: Option<PathBuf>,
        config_flag: Option<PathBuf>,
        lookup: F,
    ) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match db_flag.or_else(|| lookup("SHOPY_DB_PATH").map(PathBuf::from)) {
            Some(path) => path,
            None => default_database_path()?,
        };

        let feed_config_path = config_flag.or_else(|| lookup("SHOPY_CONFIG").map(PathBuf::from));

        debug!(
            database_path = %database_path.display(),
            feed_config_path = ?feed_config_path,
            "Application configuration resolved"
        );

        Ok(AppConfig {
            database_path,
            feed_config_path,
            json_output: false,
        })
    }

    /// Sets JSON output.
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Loads the feed configuration (file, then `SHOPY_*` overrides).
    ///
    /// A default config file that fails to parse, or an override that
    /// fails validation, is a `CONFIG_ERROR`. Only a missing default file
    /// falls back to built-in defaults.
    pub fn feed_config(&self) -> ApiResult<FeedConfig> {
        self.feed_config_with(|key| std::env::var(key).ok())
    }

    /// Loads the feed configuration with an explicit environment lookup.
    pub fn feed_config_with<F>(&self, lookup: F) -> ApiResult<FeedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self.feed_config_path {
            // An explicitly named file must exist.
            Some(ref path) if !path.exists() => Err(ApiError::config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(ref path) => Ok(FeedConfig::load_with(Some(path.clone()), lookup)?),
            None => Ok(FeedConfig::load_with(None, lookup)?),
        }
    }

    /// Creates the directory that holds the database file.
    pub fn ensure_data_dir(&self) -> ApiResult<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir(parent)?;
            }
        }
        Ok(())
    }
}

/// The platform data directory database path.
fn default_database_path() -> ApiResult<PathBuf> {
    let dirs = ProjectDirs::from("com", "shopy", "shopy")
        .ok_or_else(|| ApiError::config("Could not determine app data directory"))?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

fn create_dir(dir: &Path) -> ApiResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ApiError::config(format!("Cannot create data directory {}: {}", dir.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_flag_beats_environment() {
        let config = AppConfig::resolve_with(
            Some(PathBuf::from("/tmp/flag.db")),
            None,
            env(&[("SHOPY_DB_PATH", "/tmp/env.db")]),
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/flag.db"));
    }

    #[test]
    fn test_environment_override() {
        let config = AppConfig::resolve_with(
            None,
            None,
            env(&[("SHOPY_DB_PATH", "/tmp/env.db"), ("SHOPY_CONFIG", "/tmp/shopy.toml")]),
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.feed_config_path, Some(PathBuf::from("/tmp/shopy.toml")));
    }

    #[test]
    fn test_ensure_data_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shopy.db");
        let config = AppConfig::resolve_with(Some(path), None, env(&[])).unwrap();

        config.ensure_data_dir().unwrap();
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_missing_explicit_feed_config_is_an_error() {
        let config = AppConfig::resolve_with(
            Some(PathBuf::from("/tmp/x.db")),
            Some(PathBuf::from("/definitely/not/shopy.toml")),
            env(&[]),
        )
        .unwrap();
        let err = config.feed_config().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_invalid_feed_override_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopy.toml");
        std::fs::write(&path, "[catalog]\nurl = \"https://feed.example.com/products\"\n").unwrap();

        let config =
            AppConfig::resolve_with(Some(dir.path().join("shopy.db")), Some(path), env(&[]))
                .unwrap();
        let err = config
            .feed_config_with(env(&[("SHOPY_CATALOG_URL", "ftp://feed.example.com")]))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }

    #[test]
    fn test_unparsable_feed_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shopy.toml");
        std::fs::write(&path, "[catalog\nurl = ").unwrap();

        let config =
            AppConfig::resolve_with(Some(dir.path().join("shopy.db")), Some(path), env(&[]))
                .unwrap();
        let err = config.feed_config_with(env(&[])).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigError);
    }
}
