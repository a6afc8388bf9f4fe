// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Recall conversation archive.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Recall configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound rate limiting and retry settings.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Credential freshness settings.
    #[serde(default)]
    pub credentials: CredentialConfig,

    /// Sync scope settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            rate_limit: RateLimitConfig::default(),
            credentials: CredentialConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Bounded wait for the storage writer before a call fails as busy.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("recall/recall.db").to_string_lossy().into_owned())
        .unwrap_or_else(|| "recall.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Outbound rate limiting and retry configuration.
///
/// The remote service's quota is global, so one limiter instance is shared
/// by every call site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Master switch; disabling bypasses the sliding window entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum calls issued in any rolling 60-second window.
    #[serde(default = "default_max_calls_per_minute")]
    pub max_calls_per_minute: usize,

    /// Retries for a throttled call before giving up on it.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Retries for network-transient failures (shorter ladder).
    #[serde(default = "default_network_retry_attempts")]
    pub network_retry_attempts: u32,

    /// Base delay for exponential backoff on throttled calls.
    #[serde(default = "default_base_delay_seconds")]
    pub base_delay_seconds: u64,

    /// Cap applied to any single backoff delay.
    #[serde(default = "default_max_delay_seconds")]
    pub max_delay_seconds: u64,

    /// Upper bound of the uniform jitter added to each backoff delay.
    #[serde(default = "default_jitter_range")]
    pub jitter_range: f64,

    /// Per-call timeout; an elapsed call is classified network-transient.
    #[serde(default = "default_call_timeout_seconds")]
    pub call_timeout_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_calls_per_minute: default_max_calls_per_minute(),
            retry_attempts: default_retry_attempts(),
            network_retry_attempts: default_network_retry_attempts(),
            base_delay_seconds: default_base_delay_seconds(),
            max_delay_seconds: default_max_delay_seconds(),
            jitter_range: default_jitter_range(),
            call_timeout_seconds: default_call_timeout_seconds(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_calls_per_minute() -> usize {
    8
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_network_retry_attempts() -> u32 {
    2
}

fn default_base_delay_seconds() -> u64 {
    5
}

fn default_max_delay_seconds() -> u64 {
    60
}

fn default_jitter_range() -> f64 {
    0.5
}

fn default_call_timeout_seconds() -> u64 {
    120
}

/// Credential freshness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialConfig {
    /// Maximum credential age before a sync refuses to start.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,

    /// Override for the credential file location. Defaults to the platform
    /// config directory when unset.
    #[serde(default)]
    pub file_path: Option<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
            file_path: None,
        }
    }
}

fn default_max_age_hours() -> i64 {
    36
}

/// Sync scope configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Default lookback window for incremental runs.
    #[serde(default = "default_days_back")]
    pub days_back: u32,

    /// Re-fetch conversations whose remote update marker is newer than the
    /// stored row. Disabling makes sync insert-only.
    #[serde(default = "default_refetch_updated")]
    pub refetch_updated: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            refetch_updated: default_refetch_updated(),
        }
    }
}

fn default_days_back() -> u32 {
    7
}

fn default_refetch_updated() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
