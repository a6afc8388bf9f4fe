// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronization engine for the Recall conversation archive.
//!
//! [`SyncEngine::sync`] orchestrates one run: credential pre-flight, then
//! per bot a checkpoint-bounded remote listing, a diff against the local
//! store, a rate-limited fetch per conversation, and one atomic upsert per
//! conversation. Progress is delivered over a channel and cancellation is
//! cooperative at conversation boundaries, so an embedding front end stays
//! responsive while a run is in flight.

pub mod engine;
pub mod progress;

pub use engine::SyncEngine;
pub use progress::{progress_channel, ProgressReceiver, ProgressSender};
