// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall status` -- archive row counts.

use recall_config::RecallConfig;
use recall_core::RecallError;
use recall_store::ConversationStore;

pub async fn run(config: &RecallConfig) -> Result<(), RecallError> {
    let store = ConversationStore::open(&config.storage).await?;
    let stats = store.stats().await?;

    println!("database: {}", config.storage.database_path);
    println!(
        "{} conversations, {} messages",
        stats.conversations, stats.messages
    );
    for bot in &stats.per_bot {
        println!(
            "  {:12} {:6} conversations {:8} messages",
            bot.bot, bot.conversations, bot.messages
        );
    }

    store.close().await
}
