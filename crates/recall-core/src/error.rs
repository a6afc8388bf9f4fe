// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recall conversation archive.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Recall crates.
///
/// Remote-call failures carry the classification the rate limiter keys its
/// retry policy off: `Throttled` and `CostPrompt` are raised by
/// `ConversationSource` implementations, `RateLimitExceeded` is produced by
/// the limiter once its retry budget for a throttled call is spent.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// No credential record exists yet; acquisition has never run.
    #[error("no credentials stored; run a credential refresh first")]
    CredentialsMissing,

    /// Stored credentials are older than the configured staleness threshold.
    #[error("credentials are stale: {age_hours}h old exceeds the {max_age_hours}h threshold")]
    CredentialsStale { age_hours: i64, max_age_hours: i64 },

    /// Credentials look usable but the remote service rejected them.
    #[error("credentials failed validation: {0}")]
    CredentialsInvalid(String),

    /// The remote service throttled a single call (retryable).
    #[error("remote service throttled the call")]
    Throttled,

    /// A throttled call was retried until the retry budget ran out.
    #[error("rate limit still hit after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    /// The remote service demands payment/quota before this item can be fetched.
    #[error("remote service requires additional payment or quota for this item")]
    CostPrompt,

    /// Transport-level failure (retryable with the short backoff ladder).
    #[error("network error: {message}")]
    Network { message: String },

    /// A single remote call exceeded its per-call timeout.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The remote service answered with something we could not interpret.
    #[error("malformed remote response: {context}")]
    MalformedResponse { context: String },

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The storage writer could not be acquired within its bounded timeout.
    #[error("storage writer is busy")]
    StorageBusy,

    /// A sync run was requested while another one is still in flight.
    #[error("a sync is already running")]
    SyncInProgress,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Stable machine-readable kind, used in run summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecallError::Config(_) => "config",
            RecallError::CredentialsMissing => "credentials_missing",
            RecallError::CredentialsStale { .. } => "credentials_stale",
            RecallError::CredentialsInvalid(_) => "credentials_invalid",
            RecallError::Throttled => "throttled",
            RecallError::RateLimitExceeded { .. } => "rate_limit_exceeded",
            RecallError::CostPrompt => "cost_prompt",
            RecallError::Network { .. } => "network",
            RecallError::Timeout { .. } => "timeout",
            RecallError::MalformedResponse { .. } => "malformed_response",
            RecallError::Storage { .. } => "storage",
            RecallError::StorageBusy => "storage_busy",
            RecallError::SyncInProgress => "sync_in_progress",
            RecallError::Internal(_) => "internal",
        }
    }

    /// Helper for wrapping arbitrary storage-layer failures.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RecallError::Storage {
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_are_stable() {
        assert_eq!(RecallError::Throttled.kind(), "throttled");
        assert_eq!(RecallError::CostPrompt.kind(), "cost_prompt");
        assert_eq!(
            RecallError::RateLimitExceeded { attempts: 4 }.kind(),
            "rate_limit_exceeded"
        );
        assert_eq!(
            RecallError::CredentialsStale {
                age_hours: 40,
                max_age_hours: 36
            }
            .kind(),
            "credentials_stale"
        );
        assert_eq!(RecallError::StorageBusy.kind(), "storage_busy");
    }

    #[test]
    fn display_includes_context() {
        let err = RecallError::CredentialsStale {
            age_hours: 40,
            max_age_hours: 36,
        };
        let msg = err.to_string();
        assert!(msg.contains("40"), "got: {msg}");
        assert!(msg.contains("36"), "got: {msg}");
    }

    #[test]
    fn storage_helper_boxes_the_source() {
        let err = RecallError::storage(std::io::Error::other("disk gone"));
        assert!(err.to_string().contains("disk gone"));
    }
}
