// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential freshness gate.
//!
//! The gate answers two different questions before a sync may start:
//! `is_fresh` (pure age check, no network) and `validate` (one probe call
//! through the rate limiter -- a fresh-looking credential can still be
//! invalid). Refresh backs up the outgoing record before accepting a new
//! one and rolls back if the new set fails its probe.

use chrono::Utc;
use recall_config::model::CredentialConfig;
use recall_core::{ConversationSource, CredentialAcquirer, CredentialSet, RecallError};
use recall_limiter::RateLimiter;
use tracing::{info, warn};

use crate::store::CredentialStore;

/// Gate guarding sync start-up on credential age and validity.
pub struct CredentialGate {
    store: CredentialStore,
    max_age_hours: i64,
}

impl CredentialGate {
    pub fn new(store: CredentialStore, max_age_hours: i64) -> Self {
        Self {
            store,
            max_age_hours,
        }
    }

    /// Builds the gate from configuration, resolving the default file
    /// location when no override is set.
    pub fn from_config(config: &CredentialConfig) -> Result<Self, RecallError> {
        let path = match &config.file_path {
            Some(path) => path.into(),
            None => CredentialStore::default_path()?,
        };
        Ok(Self::new(CredentialStore::new(path), config.max_age_hours))
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Age of the stored credentials in whole hours, `None` when absent.
    pub fn age_hours(&self) -> Result<Option<i64>, RecallError> {
        Ok(self
            .store
            .load()?
            .map(|set| set.age_hours(Utc::now())))
    }

    /// Pure age check against the configured threshold; no network access.
    /// Missing credentials count as stale.
    pub fn is_fresh(&self) -> Result<bool, RecallError> {
        Ok(matches!(self.age_hours()?, Some(age) if age < self.max_age_hours))
    }

    /// Like [`is_fresh`](Self::is_fresh) but failing with
    /// [`RecallError::CredentialsStale`] (or `CredentialsMissing`) so
    /// callers can refuse to start.
    pub fn ensure_fresh(&self) -> Result<CredentialSet, RecallError> {
        let set = self.store.load()?.ok_or(RecallError::CredentialsMissing)?;
        let age_hours = set.age_hours(Utc::now());
        if age_hours >= self.max_age_hours {
            return Err(RecallError::CredentialsStale {
                age_hours,
                max_age_hours: self.max_age_hours,
            });
        }
        Ok(set)
    }

    /// One lightweight probe against the remote service, routed through the
    /// rate limiter. An auth rejection maps to `CredentialsInvalid`; pure
    /// transport failures keep their own classification so callers can tell
    /// "re-login needed" from "network down".
    pub async fn validate(
        &self,
        source: &dyn ConversationSource,
        limiter: &RateLimiter,
    ) -> Result<(), RecallError> {
        limiter
            .execute("credential probe", || source.list_bots())
            .await
            .map(|_| ())
            .map_err(|e| match e {
                RecallError::CredentialsInvalid(_) => e,
                RecallError::Network { .. }
                | RecallError::Timeout { .. }
                | RecallError::RateLimitExceeded { .. } => e,
                other => RecallError::CredentialsInvalid(other.to_string()),
            })
    }

    /// Full refresh cycle: acquire a new set, rotate the old record to the
    /// backup, persist, then re-validate the new set. A failed probe rolls
    /// the record back and reports `CredentialsInvalid`.
    pub async fn refresh(
        &self,
        acquirer: &dyn CredentialAcquirer,
        source: &dyn ConversationSource,
        limiter: &RateLimiter,
    ) -> Result<CredentialSet, RecallError> {
        info!("requesting fresh credentials from the acquirer");
        let new_set = acquirer.acquire().await?;
        self.store.save(&new_set)?;

        match self.validate(source, limiter).await {
            Ok(()) => {
                info!("refreshed credentials validated");
                Ok(new_set)
            }
            Err(e) => {
                warn!(error = %e, "refreshed credentials failed validation, rolling back");
                self.store.restore_backup()?;
                Err(RecallError::CredentialsInvalid(format!(
                    "refreshed credentials failed validation: {e}"
                )))
            }
        }
    }
}
