// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Recall crates.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a remote bot. Conversations are partitioned by bot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(pub String);

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Remote identifier of a conversation, only meaningful together with its bot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Composite conversation identity.
///
/// Remote conversation ids are never assumed unique across bots; every
/// lookup and every stored row is keyed by this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub bot: BotId,
    pub conversation: ConversationId,
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bot, self.conversation)
    }
}

/// Originator of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A single message inside a conversation.
///
/// `seq` is the remote sequence position; it increases monotonically within
/// a conversation and breaks ties when message timestamps collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub seq: i64,
}

/// A conversation as stored locally. `message_count` is derived from the
/// stored messages and kept consistent in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub key: ConversationKey,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

/// A conversation as reported by the remote listing: identity plus the
/// metadata needed to decide whether a fetch is required.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which bots a sync run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotSelection {
    All,
    One(BotId),
}

/// How far back a sync run looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackWindow {
    Days(u32),
    FullHistory,
}

/// Scope of a single sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScope {
    pub bots: BotSelection,
    pub window: LookbackWindow,
}

impl SyncScope {
    pub fn all(window: LookbackWindow) -> Self {
        Self {
            bots: BotSelection::All,
            window,
        }
    }

    pub fn bot(bot: BotId, window: LookbackWindow) -> Self {
        Self {
            bots: BotSelection::One(bot),
            window,
        }
    }
}

/// One item-level failure recorded during a sync run.
///
/// `conversation` is `None` for bot-level failures (a listing that could
/// not be fetched at all).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub bot: BotId,
    pub conversation: Option<ConversationId>,
    pub reason: String,
}

/// Terminal summary of a sync run. Always produced, even on partial failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
    /// Conversations never attempted because the run was cancelled.
    pub not_attempted: u64,
    pub failures: Vec<SyncFailure>,
}

/// Progress event emitted after each conversation is fully processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub label: String,
}

/// The credential material needed to authenticate against the remote
/// service: two session cookies plus the form key, with the acquisition
/// time used for staleness checks.
///
/// Debug output intentionally omits the token values.
#[derive(Clone, Deserialize)]
pub struct CredentialSet {
    pub primary_token: SecretString,
    pub secondary_token: SecretString,
    pub form_key: SecretString,
    pub acquired_at: DateTime<Utc>,
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("primary_token", &"[REDACTED]")
            .field("secondary_token", &"[REDACTED]")
            .field("form_key", &"[REDACTED]")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

impl CredentialSet {
    /// Age of this credential set relative to `now`, in whole hours.
    pub fn age_hours(&self, now: DateTime<Utc>) -> i64 {
        (now - self.acquired_at).num_hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        use std::str::FromStr;

        for role in [Role::User, Role::Bot] {
            let s = role.to_string();
            let parsed = Role::from_str(&s).expect("should parse back");
            assert_eq!(role, parsed);
        }
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Bot.to_string(), "bot");
    }

    #[test]
    fn conversation_key_display_includes_both_parts() {
        let key = ConversationKey {
            bot: BotId("claude".into()),
            conversation: ConversationId("c-123".into()),
        };
        assert_eq!(key.to_string(), "claude/c-123");
    }

    #[test]
    fn credential_debug_redacts_tokens() {
        let set = CredentialSet {
            primary_token: String::from("p-b-value").into(),
            secondary_token: String::from("p-lat-value").into(),
            form_key: String::from("formkey-value").into(),
            acquired_at: Utc::now(),
        };
        let dbg = format!("{set:?}");
        assert!(dbg.contains("[REDACTED]"));
        assert!(!dbg.contains("p-b-value"));
        assert!(!dbg.contains("formkey-value"));
    }

    #[test]
    fn credential_age_is_computed_from_acquired_at() {
        let now = Utc::now();
        let set = CredentialSet {
            primary_token: String::from("a").into(),
            secondary_token: String::from("b").into(),
            form_key: String::from("c").into(),
            acquired_at: now - chrono::Duration::hours(40),
        };
        assert_eq!(set.age_hours(now), 40);
    }

    #[test]
    fn sync_summary_serializes_for_reporting() {
        let summary = SyncSummary {
            added: 3,
            failures: vec![SyncFailure {
                bot: BotId("claude".into()),
                conversation: Some(ConversationId("c-2".into())),
                reason: "cost_prompt".into(),
            }],
            ..Default::default()
        };
        let json = serde_json::to_string(&summary).expect("should serialize");
        assert!(json.contains("cost_prompt"));
        assert!(json.contains("\"added\":3"));
    }
}
