// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backoff policy and call-outcome classification.
//!
//! Every remote call site shares one policy object instead of hand-rolling
//! its own retry loop. Throttled calls get exponential backoff with uniform
//! jitter; network-transient failures get a shorter ladder with fewer
//! attempts; cost prompts are never retried.

use std::time::Duration;

use rand::Rng;
use recall_config::model::RateLimitConfig;
use recall_core::RecallError;

/// How the limiter should react to a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// Remote throttle; retry with exponential backoff.
    RateLimited,
    /// Payment required; terminal for this item, never retried.
    CostPrompt,
    /// Transport hiccup or timeout; retry with the short ladder.
    Transient,
    /// Everything else; surface to the caller unchanged.
    Fatal,
}

/// Classifies a failed call for retry purposes.
pub fn classify(error: &RecallError) -> OutcomeClass {
    match error {
        RecallError::Throttled => OutcomeClass::RateLimited,
        RecallError::CostPrompt => OutcomeClass::CostPrompt,
        RecallError::Network { .. } | RecallError::Timeout { .. } | RecallError::StorageBusy => {
            OutcomeClass::Transient
        }
        _ => OutcomeClass::Fatal,
    }
}

/// Delay schedule for retried calls.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay: Duration,
    max_delay: Duration,
    jitter_range: f64,
    /// Retry budget for throttled calls.
    pub retry_attempts: u32,
    /// Retry budget for network-transient failures.
    pub network_retry_attempts: u32,
}

impl BackoffPolicy {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            base_delay: Duration::from_secs(config.base_delay_seconds),
            max_delay: Duration::from_secs(config.max_delay_seconds),
            jitter_range: config.jitter_range,
            retry_attempts: config.retry_attempts,
            network_retry_attempts: config.network_retry_attempts,
        }
    }

    /// Delay before retry number `attempt` (zero-based) of a throttled call:
    /// `min(base * 2^attempt + jitter, max_delay)`.
    pub fn throttle_delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(attempt.min(16) as i32);
        let delayed = (exponential + self.jitter()).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(delayed)
    }

    /// Shorter ladder for network-transient failures: `min(2^attempt, 10)`
    /// seconds, no jitter.
    pub fn transient_delay(&self, attempt: u32) -> Duration {
        Duration::from_secs_f64(2f64.powi(attempt.min(16) as i32).min(10.0))
    }

    fn jitter(&self) -> f64 {
        if self.jitter_range > f64::EPSILON {
            rand::thread_rng().gen_range(0.0..self.jitter_range)
        } else {
            0.0
        }
    }
}
