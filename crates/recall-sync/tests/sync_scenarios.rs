// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end sync scenarios against a scripted remote source and a real
//! temp-database store.

use std::sync::Arc;
use std::time::Duration;

use recall_config::model::RateLimitConfig;
use recall_core::{BotId, BotSelection, LookbackWindow, RecallError, Role, SyncScope};
use recall_store::ConversationFilter;
use recall_sync::progress_channel;
use recall_test_utils::{fixture_time, SyncHarness};
use tokio_util::sync::CancellationToken;

fn full_scope(bot: &BotId) -> SyncScope {
    SyncScope {
        bots: BotSelection::One(bot.clone()),
        window: LookbackWindow::FullHistory,
    }
}

fn seed_three_conversations(harness: &SyncHarness, bot: &BotId) {
    harness.source.add_conversation(
        bot,
        "c-1",
        "Python asyncio",
        fixture_time(2, 0),
        &[
            ("How do python generators work?", Role::User),
            ("They yield values lazily.", Role::Bot),
        ],
    );
    harness.source.add_conversation(
        bot,
        "c-2",
        "Rust lifetimes",
        fixture_time(2, 10),
        &[
            ("Explain lifetimes", Role::User),
            ("They bound borrows.", Role::Bot),
        ],
    );
    harness.source.add_conversation(
        bot,
        "c-3",
        "Cooking",
        fixture_time(2, 20),
        &[("Best pasta?", Role::User), ("Cacio e pepe.", Role::Bot)],
    );
}

/// Scenario 1: empty store, remote returns 3 conversations.
#[tokio::test]
async fn first_sync_adds_every_remote_conversation() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let summary = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.added, 3);
    assert_eq!(summary.updated, 0);
    assert!(summary.failures.is_empty());

    let stored = harness
        .store
        .get_conversations(&ConversationFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
    for conversation in &stored {
        assert_eq!(conversation.message_count, 2);
    }
}

/// Scenario 2: immediate re-sync with identical remote state is a no-op.
#[tokio::test]
async fn resync_with_unchanged_remote_writes_nothing() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let first = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.added, 3);

    let second = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.updated, 0);
    assert!(second.failures.is_empty());
}

/// Scenario 3: a single rate-limit response delays, then the run completes
/// cleanly with zero failures.
#[tokio::test(start_paused = true)]
async fn throttled_fetch_backs_off_then_completes() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);
    harness
        .source
        .fail_next_fetch(&bot, "c-2", RecallError::Throttled);

    let summary = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.added, 3);
    assert!(summary.failures.is_empty());
    // c-2 was fetched twice: the throttled attempt plus the retry.
    assert_eq!(harness.source.fetch_calls(), 4);

    let stored = harness
        .store
        .get_conversations(&ConversationFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
}

/// Scenario 4: a cost prompt skips exactly that conversation, with no
/// partial row left behind.
#[tokio::test]
async fn cost_prompt_skips_one_item_without_partial_rows() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);
    harness
        .source
        .fail_next_fetch(&bot, "c-2", RecallError::CostPrompt);

    let summary = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.added, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].reason, "cost_prompt");
    assert_eq!(
        summary.failures[0]
            .conversation
            .as_ref()
            .map(|c| c.0.as_str()),
        Some("c-2")
    );

    let stored = harness
        .store
        .get_conversations(&ConversationFilter::default())
        .await
        .unwrap();
    let ids: Vec<&str> = stored
        .iter()
        .map(|c| c.key.conversation.0.as_str())
        .collect();
    assert!(!ids.contains(&"c-2"), "no partial row for the skipped item");
    assert_eq!(stored.len(), 2);
}

/// Scenario 5: stale credentials abort before any network call.
#[tokio::test]
async fn stale_credentials_abort_with_zero_network_calls() {
    let harness = SyncHarness::builder()
        .with_credential_age(Some(40))
        .with_max_age_hours(36)
        .build()
        .await
        .unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let result = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await;

    match result {
        Err(RecallError::CredentialsStale {
            age_hours,
            max_age_hours,
        }) => {
            assert_eq!(age_hours, 40);
            assert_eq!(max_age_hours, 36);
        }
        other => panic!("expected CredentialsStale, got {other:?}"),
    }
    assert_eq!(harness.source.total_calls(), 0);
}

/// Missing credentials are their own pre-flight condition.
#[tokio::test]
async fn absent_credentials_abort_before_network() {
    let harness = SyncHarness::builder()
        .with_credential_age(None)
        .build()
        .await
        .unwrap();
    let bot = harness.source.add_bot("claude");

    let result = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await;
    assert!(matches!(result, Err(RecallError::CredentialsMissing)));
    assert_eq!(harness.source.total_calls(), 0);
}

/// An invalid (but fresh-looking) credential set fails the probe and
/// aborts before any conversation work.
#[tokio::test]
async fn invalid_credentials_fail_the_probe() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);
    harness
        .source
        .fail_next_probe(RecallError::CredentialsInvalid("session expired".into()));

    let result = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await;
    assert!(matches!(result, Err(RecallError::CredentialsInvalid(_))));
    assert_eq!(harness.source.list_calls(), 0);
    assert_eq!(harness.source.fetch_calls(), 0);
}

/// Scenario 6: cancellation lands right after conversation #1 commits;
/// storage keeps exactly #1 and the rest is not-attempted, not failed.
#[tokio::test]
async fn cancellation_between_conversations_keeps_storage_consistent() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let cancel = CancellationToken::new();
    harness
        .source
        .cancel_when_fetched(&bot, "c-1", cancel.clone());

    let (progress_tx, mut progress_rx) = progress_channel();
    let summary = harness
        .engine
        .sync(full_scope(&bot), Some(progress_tx), cancel)
        .await
        .unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(summary.not_attempted, 2);
    assert!(summary.failures.is_empty());

    // Storage holds exactly the completed conversation, fully formed.
    let stored = harness
        .store
        .get_conversations(&ConversationFilter::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].key.conversation.0, "c-1");
    assert_eq!(stored[0].message_count, 2);

    // The interrupted batch must not advance the checkpoint.
    assert!(harness.store.checkpoint(&bot).await.unwrap().is_none());

    // Exactly one progress event fired before the halt.
    let mut events = 0;
    while progress_rx.try_recv().is_ok() {
        events += 1;
    }
    assert_eq!(events, 1);
}

/// Concurrent sync requests are rejected, not queued.
#[tokio::test(start_paused = true)]
async fn second_sync_while_running_reports_in_progress() {
    let harness = Arc::new(SyncHarness::with_defaults().await.unwrap());
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);
    // Each fetch idles long enough for the overlapping request to land.
    harness.source.set_fetch_delay(Duration::from_secs(1));

    let first = {
        let harness = harness.clone();
        let scope = full_scope(&bot);
        tokio::spawn(async move {
            harness
                .engine
                .sync(scope, None, CancellationToken::new())
                .await
        })
    };

    // Let the first run reach its in-flight fetch, then collide with it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let overlap = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await;
    assert!(matches!(overlap, Err(RecallError::SyncInProgress)));

    let first_summary = first.await.unwrap().unwrap();
    assert_eq!(first_summary.added, 3);
}

/// Checkpoint advance bounds the next incremental listing.
#[tokio::test]
async fn checkpoint_limits_the_next_incremental_listing() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();
    assert!(harness.store.checkpoint(&bot).await.unwrap().is_some());

    // Remote gains one message in c-1 "now"; a windowed re-run picks up
    // exactly that change.
    let now = chrono::Utc::now();
    harness
        .source
        .touch_conversation(&bot, "c-1", now, ("follow-up", Role::User));

    let summary = harness
        .engine
        .sync(
            SyncScope {
                bots: BotSelection::One(bot.clone()),
                window: LookbackWindow::Days(7),
            },
            None,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.added, 0);
    assert_eq!(summary.updated, 1);

    let messages = harness
        .store
        .messages_for(&bot, &recall_core::ConversationId("c-1".into()))
        .await
        .unwrap();
    assert_eq!(messages.len(), 3);
}

/// A listing failure is bot-level: recorded once, checkpoint untouched.
#[tokio::test(start_paused = true)]
async fn listing_failure_is_recorded_without_advancing_checkpoint() {
    let harness = SyncHarness::builder()
        .with_rate_limit(RateLimitConfig {
            max_calls_per_minute: 1_000,
            jitter_range: 0.0,
            retry_attempts: 1,
            base_delay_seconds: 1,
            max_delay_seconds: 2,
            ..RateLimitConfig::default()
        })
        .build()
        .await
        .unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);
    harness.source.fail_next_listing(RecallError::Throttled);
    harness.source.fail_next_listing(RecallError::Throttled);

    let summary = harness
        .engine
        .sync(full_scope(&bot), None, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.added, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].reason, "rate_limit_exceeded");
    assert!(summary.failures[0].conversation.is_none());
    assert!(harness.store.checkpoint(&bot).await.unwrap().is_none());
}

/// All-bots scope enumerates bots through the limiter and partitions
/// conversations per bot.
#[tokio::test]
async fn all_bots_scope_syncs_every_bot() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let claude = harness.source.add_bot("claude");
    let gpt = harness.source.add_bot("gpt-4");
    harness.source.add_conversation(
        &claude,
        "c-1",
        "a",
        fixture_time(2, 0),
        &[("q", Role::User), ("a", Role::Bot)],
    );
    harness.source.add_conversation(
        &gpt,
        "c-1",
        "b",
        fixture_time(2, 0),
        &[("q", Role::User), ("a", Role::Bot)],
    );

    let summary = harness
        .engine
        .sync(
            SyncScope::all(LookbackWindow::FullHistory),
            None,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.added, 2);
    let stats = harness.store.stats().await.unwrap();
    assert_eq!(stats.conversations, 2);
    assert_eq!(stats.per_bot.len(), 2);
}

/// Progress events carry processed/total pairs up to completion.
#[tokio::test]
async fn progress_events_cover_the_whole_batch() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let (progress_tx, mut progress_rx) = progress_channel();
    let summary = harness
        .engine
        .sync(full_scope(&bot), Some(progress_tx), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(summary.added, 3);

    let mut events = Vec::new();
    while let Ok(event) = progress_rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 3);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.processed, i + 1);
        assert_eq!(event.total, 3);
        assert!(!event.label.is_empty());
    }
}

/// Conversation count in storage never decreases across syncs.
#[tokio::test]
async fn conversation_count_is_non_decreasing() {
    let harness = SyncHarness::with_defaults().await.unwrap();
    let bot = harness.source.add_bot("claude");
    seed_three_conversations(&harness, &bot);

    let mut last_count = 0;
    for _ in 0..3 {
        harness
            .engine
            .sync(full_scope(&bot), None, CancellationToken::new())
            .await
            .unwrap();
        let count = harness.store.stats().await.unwrap().conversations;
        assert!(count >= last_count);
        last_count = count;
    }
    assert_eq!(last_count, 3);
}
