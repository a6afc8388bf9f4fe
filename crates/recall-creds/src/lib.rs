// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential persistence and freshness gating.
//!
//! The store keeps the credential file (and its single rotating backup) on
//! disk; the gate decides whether a sync may start: fresh enough by age,
//! and confirmed by one lightweight probe against the remote service.
//! Acquiring new credentials is delegated to an external
//! [`recall_core::CredentialAcquirer`].

pub mod gate;
pub mod store;

pub use gate::CredentialGate;
pub use store::CredentialStore;
