// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress delivery for sync runs.
//!
//! Events flow over an unbounded channel so the engine never blocks on a
//! slow consumer; a dropped receiver simply discards further events.

use recall_core::ProgressEvent;
use tokio::sync::mpsc;

pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Creates the channel a front end listens on during a sync run.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Sends one event, ignoring a hung-up receiver.
pub(crate) fn emit(sender: Option<&ProgressSender>, event: ProgressEvent) {
    if let Some(sender) = sender {
        let _ = sender.send(event);
    }
}
