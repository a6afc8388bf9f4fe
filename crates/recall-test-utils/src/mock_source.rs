// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock conversation source for deterministic testing.
//!
//! `MockSource` implements `ConversationSource` with in-memory fixtures
//! plus scripted failures: errors queued for a call site are popped one
//! per call before the fixture data is served, which makes
//! "fail once, then succeed" scenarios one-liners.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use recall_core::{
    BotId, ConversationId, ConversationSource, CredentialAcquirer, CredentialSet, Message,
    RecallError, RemoteConversation, Role,
};

use crate::fixture_time;

/// Scripted remote service double.
pub struct MockSource {
    bots: Mutex<Vec<BotId>>,
    listings: Mutex<HashMap<BotId, Vec<RemoteConversation>>>,
    histories: Mutex<HashMap<(BotId, ConversationId), Vec<Message>>>,
    /// Errors to serve before fixture data, per call site.
    probe_failures: Mutex<VecDeque<RecallError>>,
    list_failures: Mutex<VecDeque<RecallError>>,
    fetch_failures: Mutex<HashMap<(BotId, ConversationId), VecDeque<RecallError>>>,
    /// Artificial latency per fetch, for overlap tests.
    fetch_delay: Mutex<Option<Duration>>,
    /// Tokens cancelled when the matching conversation is fetched, for
    /// deterministic cancellation-boundary tests.
    cancel_hooks: Mutex<HashMap<(BotId, ConversationId), CancellationToken>>,
    probe_calls: AtomicUsize,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            bots: Mutex::new(Vec::new()),
            listings: Mutex::new(HashMap::new()),
            histories: Mutex::new(HashMap::new()),
            probe_failures: Mutex::new(VecDeque::new()),
            list_failures: Mutex::new(VecDeque::new()),
            fetch_failures: Mutex::new(HashMap::new()),
            fetch_delay: Mutex::new(None),
            cancel_hooks: Mutex::new(HashMap::new()),
            probe_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Registers a bot with an empty listing.
    pub fn add_bot(&self, bot: &str) -> BotId {
        let bot = BotId(bot.to_string());
        self.bots.lock().unwrap().push(bot.clone());
        self.listings.lock().unwrap().entry(bot.clone()).or_default();
        bot
    }

    /// Registers a conversation with a two-message history derived from the
    /// given texts, stamped at `updated`.
    pub fn add_conversation(
        &self,
        bot: &BotId,
        id: &str,
        title: &str,
        updated: DateTime<Utc>,
        message_texts: &[(&str, Role)],
    ) {
        let conversation_id = ConversationId(id.to_string());
        let remote = RemoteConversation {
            id: conversation_id.clone(),
            title: title.to_string(),
            created_at: fixture_time(0, 0),
            updated_at: updated,
        };
        self.listings
            .lock()
            .unwrap()
            .entry(bot.clone())
            .or_default()
            .push(remote);

        let messages = message_texts
            .iter()
            .enumerate()
            .map(|(i, (text, role))| Message {
                id: format!("{id}-m{}", i + 1),
                role: *role,
                content: (*text).to_string(),
                created_at: fixture_time(1, i as u32),
                seq: (i + 1) as i64,
            })
            .collect();
        self.histories
            .lock()
            .unwrap()
            .insert((bot.clone(), conversation_id), messages);
    }

    /// Replaces the stored history and update marker of one conversation,
    /// simulating remote-side activity between runs.
    pub fn touch_conversation(
        &self,
        bot: &BotId,
        id: &str,
        updated: DateTime<Utc>,
        extra_message: (&str, Role),
    ) {
        let conversation_id = ConversationId(id.to_string());
        let mut listings = self.listings.lock().unwrap();
        let listing = listings
            .get_mut(bot)
            .and_then(|l| l.iter_mut().find(|c| c.id == conversation_id))
            .expect("conversation must exist to be touched");
        listing.updated_at = updated;

        let mut histories = self.histories.lock().unwrap();
        let history = histories
            .get_mut(&(bot.clone(), conversation_id))
            .expect("history must exist to be touched");
        let next_seq = history.len() as i64 + 1;
        history.push(Message {
            id: format!("{id}-m{next_seq}"),
            role: extra_message.1,
            content: extra_message.0.to_string(),
            created_at: updated,
            seq: next_seq,
        });
    }

    /// Queues an error for the next `list_bots` (credential probe) call.
    pub fn fail_next_probe(&self, error: RecallError) {
        self.probe_failures.lock().unwrap().push_back(error);
    }

    /// Queues an error for the next `list_conversations` call.
    pub fn fail_next_listing(&self, error: RecallError) {
        self.list_failures.lock().unwrap().push_back(error);
    }

    /// Queues an error for the next `fetch_messages` call on one conversation.
    pub fn fail_next_fetch(&self, bot: &BotId, id: &str, error: RecallError) {
        self.fetch_failures
            .lock()
            .unwrap()
            .entry((bot.clone(), ConversationId(id.to_string())))
            .or_default()
            .push_back(error);
    }

    /// Adds artificial latency to every fetch.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Cancels `token` the moment the given conversation is fetched. The
    /// fetch itself still succeeds, which pins cancellation exactly at the
    /// following conversation boundary.
    pub fn cancel_when_fetched(&self, bot: &BotId, id: &str, token: CancellationToken) {
        self.cancel_hooks
            .lock()
            .unwrap()
            .insert((bot.clone(), ConversationId(id.to_string())), token);
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total remote calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.probe_calls() + self.list_calls() + self.fetch_calls()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationSource for MockSource {
    async fn list_bots(&self) -> Result<Vec<BotId>, RecallError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.probe_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.bots.lock().unwrap().clone())
    }

    async fn list_conversations(
        &self,
        bot: &BotId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteConversation>, RecallError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let listings = self.listings.lock().unwrap();
        let all = listings.get(bot).cloned().unwrap_or_default();
        Ok(match since {
            Some(since) => all.into_iter().filter(|c| c.updated_at >= since).collect(),
            None => all,
        })
    }

    async fn fetch_messages(
        &self,
        bot: &BotId,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, RecallError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let key = (bot.clone(), conversation.clone());

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(token) = self.cancel_hooks.lock().unwrap().remove(&key) {
            token.cancel();
        }

        if let Some(error) = self
            .fetch_failures
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front())
        {
            return Err(error);
        }
        self.histories
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| RecallError::MalformedResponse {
                context: format!("unknown conversation {}/{conversation}", bot),
            })
    }
}

/// Acquirer double returning a pre-configured credential set.
pub struct MockAcquirer {
    set: CredentialSet,
}

impl MockAcquirer {
    pub fn returning(set: CredentialSet) -> Self {
        Self { set }
    }
}

#[async_trait]
impl CredentialAcquirer for MockAcquirer {
    async fn acquire(&self) -> Result<CredentialSet, RecallError> {
        Ok(self.set.clone())
    }
}
