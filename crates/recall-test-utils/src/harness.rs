// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness assembling a complete sync stack.
//!
//! `SyncHarness` wires a `MockSource`, a temp-directory SQLite store, a
//! jitter-free rate limiter, and a credential gate seeded with a fresh
//! credential record. Tests drive `harness.engine.sync(...)` and assert
//! against `harness.store` and `harness.source` directly.

use std::sync::Arc;

use recall_config::model::{RateLimitConfig, StorageConfig, SyncConfig};
use recall_core::RecallError;
use recall_creds::{CredentialGate, CredentialStore};
use recall_limiter::RateLimiter;
use recall_store::ConversationStore;
use recall_sync::SyncEngine;

use crate::credential_set_aged;
use crate::mock_source::MockSource;

/// Builder for the harness; every knob has a test-friendly default.
pub struct SyncHarnessBuilder {
    rate_limit: RateLimitConfig,
    sync: SyncConfig,
    credential_age_hours: Option<i64>,
    max_age_hours: i64,
}

impl SyncHarnessBuilder {
    fn new() -> Self {
        Self {
            rate_limit: RateLimitConfig {
                max_calls_per_minute: 1_000,
                jitter_range: 0.0,
                base_delay_seconds: 1,
                max_delay_seconds: 4,
                ..RateLimitConfig::default()
            },
            sync: SyncConfig::default(),
            credential_age_hours: Some(0),
            max_age_hours: 36,
        }
    }

    /// Overrides the limiter configuration.
    pub fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Overrides the sync configuration.
    pub fn with_sync_config(mut self, config: SyncConfig) -> Self {
        self.sync = config;
        self
    }

    /// Seeds credentials of the given age; `None` leaves no record at all.
    pub fn with_credential_age(mut self, age_hours: Option<i64>) -> Self {
        self.credential_age_hours = age_hours;
        self
    }

    /// Overrides the staleness threshold.
    pub fn with_max_age_hours(mut self, hours: i64) -> Self {
        self.max_age_hours = hours;
        self
    }

    pub async fn build(self) -> Result<SyncHarness, RecallError> {
        let temp_dir = tempfile::TempDir::new().map_err(RecallError::storage)?;

        let storage_config = StorageConfig {
            database_path: temp_dir
                .path()
                .join("archive.db")
                .to_string_lossy()
                .into_owned(),
            ..StorageConfig::default()
        };
        let store = Arc::new(ConversationStore::open(&storage_config).await?);

        let credential_store =
            CredentialStore::new(temp_dir.path().join("credentials.json"));
        if let Some(age_hours) = self.credential_age_hours {
            credential_store.save(&credential_set_aged(age_hours))?;
        }
        let gate = Arc::new(CredentialGate::new(credential_store, self.max_age_hours));

        let source = Arc::new(MockSource::new());
        let limiter = Arc::new(RateLimiter::new(&self.rate_limit));
        let engine = SyncEngine::new(
            source.clone(),
            store.clone(),
            limiter.clone(),
            gate.clone(),
            self.sync,
        );

        Ok(SyncHarness {
            source,
            store,
            limiter,
            gate,
            engine,
            _temp_dir: temp_dir,
        })
    }
}

/// Fully wired sync stack over a temp database.
pub struct SyncHarness {
    pub source: Arc<MockSource>,
    pub store: Arc<ConversationStore>,
    pub limiter: Arc<RateLimiter>,
    pub gate: Arc<CredentialGate>,
    pub engine: SyncEngine,
    _temp_dir: tempfile::TempDir,
}

impl SyncHarness {
    pub fn builder() -> SyncHarnessBuilder {
        SyncHarnessBuilder::new()
    }

    /// Harness with all defaults: fresh credentials, relaxed limiter.
    pub async fn with_defaults() -> Result<Self, RecallError> {
        Self::builder().build().await
    }
}
