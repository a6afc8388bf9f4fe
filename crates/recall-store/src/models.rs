// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-local model types.
//!
//! The canonical domain types live in `recall-core::types`; this module
//! re-exports them for convenience and defines the types that only exist
//! at the storage boundary: upsert outcomes, read filters, search hits,
//! and archive statistics.

pub use recall_core::types::{
    BotId, Conversation, ConversationId, ConversationKey, Message, Role,
};

/// What an atomic conversation upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The conversation did not exist before.
    Inserted,
    /// The conversation existed and gained messages or changed metadata.
    Updated,
    /// Nothing changed; zero rows were written.
    Unchanged,
}

/// Filter and pagination for conversation reads and searches.
#[derive(Debug, Clone)]
pub struct ConversationFilter {
    pub bot: Option<BotId>,
    /// Inclusive lower bound on `updated_at`.
    pub updated_after: Option<chrono::DateTime<chrono::Utc>>,
    /// Inclusive upper bound on `updated_at`.
    pub updated_before: Option<chrono::DateTime<chrono::Utc>>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ConversationFilter {
    fn default() -> Self {
        Self {
            bot: None,
            updated_after: None,
            updated_before: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl ConversationFilter {
    pub fn for_bot(bot: BotId) -> Self {
        Self {
            bot: Some(bot),
            ..Self::default()
        }
    }
}

/// One search result: the conversation plus its best BM25 score.
///
/// BM25 scores are negative (more negative = more relevant); hits are
/// ordered by score, then recency.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub conversation: Conversation,
    pub score: f64,
}

/// Per-bot row counts for the status surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStats {
    pub bot: BotId,
    pub conversations: u64,
    pub messages: u64,
}

/// Archive-wide row counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub conversations: u64,
    pub messages: u64,
    pub per_bot: Vec<BotStats>,
}
