// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk credential record with a single rotating backup.
//!
//! The file is plain JSON at the platform config directory. Before any
//! overwrite the previous record is moved to `credentials.json.bak`, so a
//! refresh that turns out to be invalid can be rolled back. On unix the
//! file is written with mode 0600.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use recall_core::{CredentialSet, RecallError};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Serialized form of a credential set. Secrets are exposed only here,
/// at the disk boundary.
#[derive(Serialize, Deserialize)]
struct CredentialRecord {
    primary_token: String,
    secondary_token: String,
    form_key: String,
    acquired_at: DateTime<Utc>,
}

impl From<&CredentialSet> for CredentialRecord {
    fn from(set: &CredentialSet) -> Self {
        Self {
            primary_token: set.primary_token.expose_secret().to_string(),
            secondary_token: set.secondary_token.expose_secret().to_string(),
            form_key: set.form_key.expose_secret().to_string(),
            acquired_at: set.acquired_at,
        }
    }
}

impl From<CredentialRecord> for CredentialSet {
    fn from(record: CredentialRecord) -> Self {
        Self {
            primary_token: record.primary_token.into(),
            secondary_token: record.secondary_token.into(),
            form_key: record.form_key.into(),
            acquired_at: record.acquired_at,
        }
    }
}

/// File-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `<config dir>/recall/credentials.json`.
    pub fn default_path() -> Result<PathBuf, RecallError> {
        dirs::config_dir()
            .map(|d| d.join("recall/credentials.json"))
            .ok_or_else(|| RecallError::Config("no platform config directory available".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Reads the stored credential set, if any.
    pub fn load(&self) -> Result<Option<CredentialSet>, RecallError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RecallError::storage(e)),
        };
        let record: CredentialRecord =
            serde_json::from_slice(&bytes).map_err(RecallError::storage)?;
        Ok(Some(record.into()))
    }

    /// Persists a credential set, rotating any existing record to the
    /// backup file first. The write itself goes through a temp file plus
    /// rename so a crash never leaves a half-written record.
    pub fn save(&self, set: &CredentialSet) -> Result<(), RecallError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(RecallError::storage)?;
        }

        if self.path.exists() {
            fs::rename(&self.path, self.backup_path()).map_err(RecallError::storage)?;
            debug!(backup = %self.backup_path().display(), "rotated previous credential record");
        }

        let record = CredentialRecord::from(set);
        let json = serde_json::to_vec_pretty(&record).map_err(RecallError::storage)?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).map_err(RecallError::storage)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))
                .map_err(RecallError::storage)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(RecallError::storage)?;

        info!(path = %self.path.display(), "credential record saved");
        Ok(())
    }

    /// Restores the rotating backup over the current record.
    ///
    /// Returns `false` when no backup exists.
    pub fn restore_backup(&self) -> Result<bool, RecallError> {
        let backup = self.backup_path();
        if !backup.exists() {
            return Ok(false);
        }
        fs::rename(&backup, &self.path).map_err(RecallError::storage)?;
        info!(path = %self.path.display(), "credential record restored from backup");
        Ok(true)
    }
}
