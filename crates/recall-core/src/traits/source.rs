// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote conversation source trait.
//!
//! The remote protocol itself is not implemented in this repository; the
//! sync engine treats whatever speaks it as an opaque, fallible capability.
//! Implementations signal their failure mode through the `RecallError`
//! variants the rate limiter classifies: `Throttled`, `CostPrompt`,
//! `Network`, `CredentialsInvalid`, and `MalformedResponse`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::RecallError;
use crate::types::{BotId, ConversationId, Message, RemoteConversation};

/// A remote service that can enumerate bots and conversations and fetch
/// full message histories.
///
/// All calls MUST be routed through the rate limiter by callers; the trait
/// itself is limit-agnostic.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Lists the bots visible to the current credentials.
    ///
    /// Also used as the lightweight credential-validation probe.
    async fn list_bots(&self) -> Result<Vec<BotId>, RecallError>;

    /// Lists conversations for one bot, optionally bounded to those updated
    /// at or after `since`. Order is the remote's order and is preserved by
    /// the sync engine.
    async fn list_conversations(
        &self,
        bot: &BotId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteConversation>, RecallError>;

    /// Fetches the full message history of one conversation.
    async fn fetch_messages(
        &self,
        bot: &BotId,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, RecallError>;
}
