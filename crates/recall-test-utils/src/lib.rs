// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Recall integration tests.
//!
//! `MockSource` stands in for the external remote client with scripted
//! per-call outcomes; `SyncHarness` assembles a complete engine stack over
//! a temp database so scenario tests run without any network.

pub mod harness;
pub mod mock_source;

pub use harness::{SyncHarness, SyncHarnessBuilder};
pub use mock_source::{MockAcquirer, MockSource};

use chrono::{DateTime, TimeZone, Utc};
use recall_core::CredentialSet;

/// Deterministic timestamp helper for fixtures.
pub fn fixture_time(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
}

/// Credential fixture aged by the given number of hours.
pub fn credential_set_aged(age_hours: i64) -> CredentialSet {
    CredentialSet {
        primary_token: String::from("p-b-fixture").into(),
        secondary_token: String::from("p-lat-fixture").into(),
        form_key: String::from("formkey-fixture").into(),
        acquired_at: Utc::now() - chrono::Duration::hours(age_hours),
    }
}
