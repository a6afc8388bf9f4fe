// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The synchronization engine.
//!
//! Invariants the engine maintains:
//! - one run at a time: a second `sync` call gets `SyncInProgress` instead
//!   of queuing;
//! - pre-flight before network: stale or invalid credentials abort before
//!   a single conversation is touched;
//! - item isolation: a failing conversation is recorded in the summary and
//!   never aborts its batch;
//! - checkpoint after batch: a bot's checkpoint only advances once every
//!   listed conversation was attempted, so a crash or cancellation replays
//!   instead of skipping;
//! - cancellation at conversation boundaries: an in-flight conversation
//!   finishes (keeping upserts atomic) before the run stops.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use recall_config::model::SyncConfig;
use recall_core::{
    BotId, BotSelection, Conversation, ConversationKey, LookbackWindow, ProgressEvent,
    RecallError, RemoteConversation, SyncFailure, SyncScope, SyncSummary,
};
use recall_creds::CredentialGate;
use recall_limiter::RateLimiter;
use recall_store::{ConversationStore, UpsertOutcome};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::progress::{emit, ProgressSender};

/// Bounded retries for a busy storage writer.
const STORAGE_RETRY_ATTEMPTS: u32 = 3;
const STORAGE_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Orchestrates sync runs against one remote source and one local store.
///
/// All collaborators are injected once at construction; the engine holds
/// no ambient global state.
pub struct SyncEngine {
    source: Arc<dyn recall_core::ConversationSource>,
    store: Arc<ConversationStore>,
    limiter: Arc<RateLimiter>,
    gate: Arc<CredentialGate>,
    config: SyncConfig,
    /// Mutual exclusion for runs; `try_lock` makes "already running" a
    /// condition instead of a silent queue.
    running: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn recall_core::ConversationSource>,
        store: Arc<ConversationStore>,
        limiter: Arc<RateLimiter>,
        gate: Arc<CredentialGate>,
        config: SyncConfig,
    ) -> Self {
        Self {
            source,
            store,
            limiter,
            gate,
            config,
            running: Mutex::new(()),
        }
    }

    /// Runs one synchronization pass over the given scope.
    ///
    /// Always returns a summary for a run that started; pre-flight
    /// conditions (`SyncInProgress`, `CredentialsMissing`/`Stale`/`Invalid`)
    /// are the only error returns. Item-level failures end up in
    /// [`SyncSummary::failures`].
    pub async fn sync(
        &self,
        scope: SyncScope,
        progress: Option<ProgressSender>,
        cancel: CancellationToken,
    ) -> Result<SyncSummary, RecallError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| RecallError::SyncInProgress)?;

        // Pre-flight: age check is local; the probe is the first (and only
        // pre-sync) network call, routed through the limiter like the rest.
        self.gate.ensure_fresh()?;
        self.gate.validate(self.source.as_ref(), &self.limiter).await?;

        let bots = self.bots_in_scope(&scope).await?;
        info!(bots = bots.len(), "sync run starting");

        let mut summary = SyncSummary::default();
        for bot in &bots {
            if cancel.is_cancelled() {
                info!(%bot, "sync cancelled before bot batch");
                break;
            }
            self.sync_bot(bot, &scope, &mut summary, progress.as_ref(), &cancel)
                .await?;
        }

        info!(
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped,
            not_attempted = summary.not_attempted,
            failures = summary.failures.len(),
            "sync run finished"
        );
        Ok(summary)
    }

    async fn bots_in_scope(&self, scope: &SyncScope) -> Result<Vec<BotId>, RecallError> {
        match &scope.bots {
            BotSelection::One(bot) => Ok(vec![bot.clone()]),
            BotSelection::All => {
                self.limiter
                    .execute("list bots", || self.source.list_bots())
                    .await
            }
        }
    }

    /// Lower bound for the remote listing: the checkpoint narrows the
    /// window, the scope caps how far back a run may reach.
    async fn since_for(
        &self,
        bot: &BotId,
        window: LookbackWindow,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, RecallError> {
        match window {
            LookbackWindow::FullHistory => Ok(None),
            LookbackWindow::Days(days) => {
                let window_start = now - chrono::Duration::days(i64::from(days));
                Ok(Some(match self.store.checkpoint(bot).await? {
                    Some(checkpoint) => checkpoint.max(window_start),
                    None => window_start,
                }))
            }
        }
    }

    async fn sync_bot(
        &self,
        bot: &BotId,
        scope: &SyncScope,
        summary: &mut SyncSummary,
        progress: Option<&ProgressSender>,
        cancel: &CancellationToken,
    ) -> Result<(), RecallError> {
        let batch_started = Utc::now();
        let since = self.since_for(bot, scope.window, batch_started).await?;

        let listing = match self
            .limiter
            .execute("list conversations", || {
                self.source.list_conversations(bot, since)
            })
            .await
        {
            Ok(listing) => listing,
            Err(e) => {
                // Bot-level failure: record it, keep the checkpoint where it
                // was, move on to the next bot.
                warn!(%bot, error = %e, "conversation listing failed");
                summary.failures.push(SyncFailure {
                    bot: bot.clone(),
                    conversation: None,
                    reason: e.kind().to_string(),
                });
                return Ok(());
            }
        };

        let known = self.store.known_conversations(bot).await?;
        let mut plan: Vec<RemoteConversation> = Vec::new();
        for remote in listing {
            let needs_fetch = match known.get(&remote.id) {
                None => true,
                Some(stored_updated_at) => {
                    self.config.refetch_updated && remote.updated_at > *stored_updated_at
                }
            };
            if needs_fetch {
                plan.push(remote);
            } else {
                summary.skipped += 1;
            }
        }

        let total = plan.len();
        debug!(%bot, total, skipped_upfront = summary.skipped, "bot batch planned");

        for (index, remote) in plan.iter().enumerate() {
            if cancel.is_cancelled() {
                // Remaining items were never started; they are not failures,
                // and the checkpoint must not move past them.
                summary.not_attempted += (total - index) as u64;
                info!(%bot, remaining = total - index, "sync cancelled mid-batch");
                return Ok(());
            }

            let key = ConversationKey {
                bot: bot.clone(),
                conversation: remote.id.clone(),
            };
            self.sync_conversation(&key, remote, summary).await;

            let label = if remote.title.is_empty() {
                remote.id.0.clone()
            } else {
                remote.title.clone()
            };
            emit(
                progress,
                ProgressEvent {
                    processed: index + 1,
                    total,
                    label,
                },
            );
        }

        // Every listed conversation was attempted; the batch is complete.
        self.store.put_checkpoint(bot, batch_started).await?;
        debug!(%bot, checkpoint = %batch_started, "checkpoint advanced");
        Ok(())
    }

    /// Fetches and stores one conversation. Every classified failure is
    /// absorbed into the summary; only programming-level storage faults
    /// would propagate, and those are caught by the caller's `?` above.
    async fn sync_conversation(
        &self,
        key: &ConversationKey,
        remote: &RemoteConversation,
        summary: &mut SyncSummary,
    ) {
        let messages = match self
            .limiter
            .execute("fetch messages", || {
                self.source.fetch_messages(&key.bot, &key.conversation)
            })
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!(conversation = %key, error = %e, "conversation fetch failed");
                summary.failures.push(SyncFailure {
                    bot: key.bot.clone(),
                    conversation: Some(key.conversation.clone()),
                    reason: e.kind().to_string(),
                });
                return;
            }
        };

        let conversation = Conversation {
            key: key.clone(),
            title: remote.title.clone(),
            created_at: remote.created_at,
            updated_at: remote.updated_at,
            message_count: messages.len() as i64,
        };

        match self.upsert_with_retry(&conversation, &messages).await {
            Ok(UpsertOutcome::Inserted) => summary.added += 1,
            Ok(UpsertOutcome::Updated) => summary.updated += 1,
            Ok(UpsertOutcome::Unchanged) => summary.skipped += 1,
            Err(e) => {
                warn!(conversation = %key, error = %e, "conversation upsert failed");
                summary.failures.push(SyncFailure {
                    bot: key.bot.clone(),
                    conversation: Some(key.conversation.clone()),
                    reason: e.kind().to_string(),
                });
            }
        }
    }

    /// The write call site's bounded retry for a busy writer.
    async fn upsert_with_retry(
        &self,
        conversation: &Conversation,
        messages: &[recall_core::Message],
    ) -> Result<UpsertOutcome, RecallError> {
        let mut attempt = 0u32;
        loop {
            match self.store.upsert_conversation(conversation, messages).await {
                Err(RecallError::StorageBusy) if attempt < STORAGE_RETRY_ATTEMPTS => {
                    attempt += 1;
                    debug!(attempt, "storage writer busy, retrying");
                    tokio::time::sleep(STORAGE_RETRY_DELAY).await;
                }
                other => return other,
            }
        }
    }
}
