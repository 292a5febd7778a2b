//! Store configuration
//!
//! Central location for the retention limits, windows and defaults used
//! throughout the store, plus the file-backed [`StoreConfig`].

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

// ===== Retention Limits =====

/// Maximum number of audit log entries kept (newest first)
pub const AUDIT_LOG_CAPACITY: usize = 1000;

/// Maximum number of notifications kept per target user id
pub const NOTIFICATIONS_PER_USER: usize = 100;

/// Number of audit entries included in a data export
pub const EXPORT_AUDIT_LIMIT: usize = 500;

/// Default page size when listing audit entries
pub const DEFAULT_AUDIT_PAGE: usize = 100;

// ===== Cache =====

/// TTL applied when a cache write does not specify one
pub const DEFAULT_CACHE_TTL_MINUTES: u32 = 60;

/// Cache key under which the analytics aggregate is served
pub const ANALYTICS_CACHE_KEY: &str = "analytics_snapshot";

// ===== Analytics Windows =====

/// A user counts as active if they filed a complaint within this many days
pub const ACTIVE_USER_WINDOW_DAYS: i64 = 30;

/// Number of most recent monthly buckets reported in trends
pub const MONTHLY_TREND_WINDOW: usize = 12;

// ===== Sentinels =====

/// Complaint owner id used for reports filed without an account
pub const ANONYMOUS_USER_ID: &str = "anonymous";

/// Notification target id that broadcasts to every user
pub const BROADCAST_USER_ID: &str = "all";

/// Identifier of the singleton settings and analytics records
pub const SINGLETON_ID: &str = "main";

// ===== Export =====

/// Format version written into every export
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Environment variable that overrides the database path
pub const DATABASE_PATH_ENV: &str = "CRIMEWATCH_DB";

/// Runtime configuration for a store instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_audit_log_capacity")]
    pub audit_log_capacity: usize,
    #[serde(default = "default_notifications_per_user")]
    pub notifications_per_user: usize,
    #[serde(default = "default_cache_ttl_minutes")]
    pub default_cache_ttl_minutes: u32,
    #[serde(default = "default_export_audit_limit")]
    pub export_audit_limit: usize,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("crimewatch.sqlite")
}

fn default_audit_log_capacity() -> usize {
    AUDIT_LOG_CAPACITY
}

fn default_notifications_per_user() -> usize {
    NOTIFICATIONS_PER_USER
}

fn default_cache_ttl_minutes() -> u32 {
    DEFAULT_CACHE_TTL_MINUTES
}

fn default_export_audit_limit() -> usize {
    EXPORT_AUDIT_LIMIT
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            audit_log_capacity: default_audit_log_capacity(),
            notifications_per_user: default_notifications_per_user(),
            default_cache_ttl_minutes: default_cache_ttl_minutes(),
            export_audit_limit: default_export_audit_limit(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a JSON file, filling missing fields with defaults.
    ///
    /// The database path may be overridden with `CRIMEWATCH_DB`.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: StoreConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        tracing::info!("Loaded store configuration from {:?}", path);
        Ok(config.with_env_overrides())
    }

    /// Apply environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(db) = std::env::var(DATABASE_PATH_ENV) {
            if !db.trim().is_empty() {
                self.database_path = PathBuf::from(db);
            }
        }
        self
    }
}
