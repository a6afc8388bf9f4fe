// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate limiting for every call to the remote conversation service.
//!
//! One [`RateLimiter`] is shared by all call sites because the remote quota
//! is global, not per-endpoint. [`RateLimiter::acquire`] suspends the caller
//! until a slot is free in the rolling window; [`RateLimiter::execute`] adds
//! the shared retry policy on top: exponential backoff for throttled calls,
//! a short ladder for transient network failures, and an immediate return
//! for cost prompts.

pub mod backoff;
mod window;

pub use backoff::{classify, BackoffPolicy, OutcomeClass};

use std::future::Future;
use std::time::Duration;

use recall_config::model::RateLimitConfig;
use recall_core::RecallError;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::window::{Admission, SlidingWindow};

/// Proof that a call slot was granted, stamped with its issuance time.
#[derive(Debug)]
pub struct CallPermit {
    issued_at: Instant,
}

impl CallPermit {
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }
}

/// Shared sliding-window limiter plus retry executor.
///
/// The window state is guarded by a single lock; per-call retry counters
/// live on the stack of each `execute` invocation, so one exhausted call
/// never poisons the window for other call sites.
pub struct RateLimiter {
    enabled: bool,
    call_timeout: Duration,
    window: Mutex<SlidingWindow>,
    policy: BackoffPolicy,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            call_timeout: Duration::from_secs(config.call_timeout_seconds),
            window: Mutex::new(SlidingWindow::new(
                config.max_calls_per_minute,
                Duration::from_secs(60),
            )),
            policy: BackoffPolicy::from_config(config),
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Suspends until a call slot is available, then returns a permit.
    ///
    /// Never spins: when the window is full the caller sleeps exactly until
    /// the oldest recorded call leaves the rolling window.
    pub async fn acquire(&self) -> CallPermit {
        if !self.enabled {
            return CallPermit {
                issued_at: Instant::now(),
            };
        }

        loop {
            let admission = { self.window.lock().await.try_admit(Instant::now()) };
            match admission {
                Admission::Admitted => {
                    return CallPermit {
                        issued_at: Instant::now(),
                    }
                }
                Admission::Wait(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limit window full, waiting for a slot");
                    sleep(wait).await;
                }
            }
        }
    }

    /// Runs one logical remote call through the window and the retry policy.
    ///
    /// `call` is invoked once per attempt; each attempt takes a fresh window
    /// slot and is bounded by the configured per-call timeout (an elapsed
    /// timeout is classified as network-transient). Exhausting the throttle
    /// budget surfaces as [`RecallError::RateLimitExceeded`]; a cost prompt
    /// is returned unchanged after the first attempt.
    pub async fn execute<T, F, Fut>(&self, label: &str, mut call: F) -> Result<T, RecallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RecallError>>,
    {
        let mut throttled_attempts = 0u32;
        let mut transient_attempts = 0u32;

        loop {
            let _permit = self.acquire().await;
            let outcome = match timeout(self.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(RecallError::Timeout {
                    duration: self.call_timeout,
                }),
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match classify(&error) {
                OutcomeClass::RateLimited => {
                    throttled_attempts += 1;
                    if throttled_attempts > self.policy.retry_attempts {
                        warn!(label, attempts = throttled_attempts, "rate limit retries exhausted");
                        return Err(RecallError::RateLimitExceeded {
                            attempts: throttled_attempts,
                        });
                    }
                    let delay = self.policy.throttle_delay(throttled_attempts - 1);
                    warn!(
                        label,
                        attempt = throttled_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "throttled, backing off before retry"
                    );
                    sleep(delay).await;
                }
                OutcomeClass::CostPrompt => {
                    warn!(label, "remote requires payment for this item, not retrying");
                    return Err(error);
                }
                OutcomeClass::Transient => {
                    transient_attempts += 1;
                    if transient_attempts > self.policy.network_retry_attempts {
                        return Err(error);
                    }
                    let delay = self.policy.transient_delay(transient_attempts - 1);
                    warn!(
                        label,
                        attempt = transient_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient failure, retrying"
                    );
                    sleep(delay).await;
                }
                OutcomeClass::Fatal => return Err(error),
            }
        }
    }
}
