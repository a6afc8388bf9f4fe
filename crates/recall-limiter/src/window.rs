// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sliding window over recent call timestamps.
//!
//! The window only records issuance times; it never sleeps. Waiting is the
//! limiter's job so the lock is held for microseconds, not for the wait.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Outcome of asking the window for a call slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// A slot was free; the call timestamp has been recorded.
    Admitted,
    /// The window is full; retry after the given wait.
    Wait(Duration),
}

/// Bounded record of the last `max_calls` issuance timestamps within `period`.
#[derive(Debug)]
pub(crate) struct SlidingWindow {
    timestamps: VecDeque<Instant>,
    max_calls: usize,
    period: Duration,
}

impl SlidingWindow {
    pub(crate) fn new(max_calls: usize, period: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_calls),
            max_calls,
            period,
        }
    }

    /// Expires old entries, then either records `now` as a new call or
    /// reports how long until the oldest entry leaves the window.
    pub(crate) fn try_admit(&mut self, now: Instant) -> Admission {
        while let Some(front) = self.timestamps.front() {
            if now.duration_since(*front) >= self.period {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() < self.max_calls {
            self.timestamps.push_back(now);
            return Admission::Admitted;
        }

        match self.timestamps.front() {
            Some(oldest) => Admission::Wait(self.period.saturating_sub(now.duration_since(*oldest))),
            // max_calls == 0 leaves nothing to wait on; admit rather than wedge.
            None => {
                self.timestamps.push_back(now);
                Admission::Admitted
            }
        }
    }
}
