// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential acquisition trait.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::types::CredentialSet;

/// Obtains a fresh credential set from the outside world.
///
/// Implementations range from fully manual entry to automated
/// browser-session extraction; the gate is agnostic to which secrets were
/// typed and which were scraped. Acquisition failures should be reported
/// as `RecallError::CredentialsInvalid` or `RecallError::Internal`.
#[async_trait]
pub trait CredentialAcquirer: Send + Sync {
    /// Produces a new credential set, stamped with its acquisition time.
    async fn acquire(&self) -> Result<CredentialSet, RecallError>;
}
