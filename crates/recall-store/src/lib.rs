// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence and full-text search for the Recall conversation archive.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, atomic conversation upserts, and
//! an FTS5 index over message content that is maintained in the same
//! transaction as every message write.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod search;

pub use database::Database;
pub use models::*;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use recall_config::model::StorageConfig;
use recall_core::RecallError;

/// Facade over the database for the sync engine and read-only consumers.
///
/// All writes go through [`upsert_conversation`](Self::upsert_conversation)
/// and [`put_checkpoint`](Self::put_checkpoint); everything else is a read.
pub struct ConversationStore {
    db: Database,
}

impl ConversationStore {
    /// Opens the store, creating the database and running migrations as needed.
    pub async fn open(config: &StorageConfig) -> Result<Self, RecallError> {
        Ok(Self {
            db: Database::open(config).await?,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Atomically inserts or updates one conversation with its messages.
    pub async fn upsert_conversation(
        &self,
        conversation: &Conversation,
        messages: &[Message],
    ) -> Result<UpsertOutcome, RecallError> {
        queries::conversations::upsert_conversation(&self.db, conversation, messages).await
    }

    /// Conversations matching the filter, newest activity first.
    pub async fn get_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<Conversation>, RecallError> {
        queries::conversations::list_conversations(&self.db, filter).await
    }

    /// One conversation with its full message history.
    pub async fn get_conversation(
        &self,
        bot: &BotId,
        conversation: &ConversationId,
    ) -> Result<Option<(Conversation, Vec<Message>)>, RecallError> {
        queries::conversations::get_conversation(&self.db, bot, conversation).await
    }

    /// Messages of one conversation in display order.
    pub async fn messages_for(
        &self,
        bot: &BotId,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, RecallError> {
        queries::messages::messages_for(&self.db, bot, conversation).await
    }

    /// Full-text search over message content, intersected with the filter.
    pub async fn search(
        &self,
        query: &str,
        filter: &ConversationFilter,
    ) -> Result<Vec<SearchHit>, RecallError> {
        search::search(&self.db, query, filter).await
    }

    /// (remote id -> stored update marker) for one bot, for sync diffing.
    pub async fn known_conversations(
        &self,
        bot: &BotId,
    ) -> Result<HashMap<ConversationId, DateTime<Utc>>, RecallError> {
        queries::conversations::known_conversations(&self.db, bot).await
    }

    /// Last completed sync position for one bot.
    pub async fn checkpoint(&self, bot: &BotId) -> Result<Option<DateTime<Utc>>, RecallError> {
        queries::checkpoints::get_checkpoint(&self.db, bot).await
    }

    /// Advances one bot's checkpoint after a fully attempted batch.
    pub async fn put_checkpoint(
        &self,
        bot: &BotId,
        last_synced_at: DateTime<Utc>,
    ) -> Result<(), RecallError> {
        queries::checkpoints::put_checkpoint(&self.db, bot, last_synced_at).await
    }

    /// Archive-wide and per-bot row counts.
    pub async fn stats(&self) -> Result<StoreStats, RecallError> {
        queries::conversations::stats(&self.db).await
    }

    /// Checkpoints the WAL and closes the underlying connection.
    pub async fn close(self) -> Result<(), RecallError> {
        self.db.close().await
    }
}
