// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall search` -- full-text search over message content.

use clap::Args;
use recall_config::RecallConfig;
use recall_core::{BotId, RecallError};
use recall_store::{ConversationFilter, ConversationStore};

#[derive(Args)]
pub struct SearchArgs {
    /// Query text; tokens are matched case-insensitively, all must occur.
    pub query: String,

    /// Restrict to one bot.
    #[arg(long)]
    pub bot: Option<String>,

    /// Maximum hits to print.
    #[arg(long, default_value_t = 25)]
    pub limit: u32,
}

pub async fn run(config: &RecallConfig, args: SearchArgs) -> Result<(), RecallError> {
    let store = ConversationStore::open(&config.storage).await?;

    let filter = ConversationFilter {
        bot: args.bot.map(BotId),
        limit: args.limit,
        ..ConversationFilter::default()
    };
    let hits = store.search(&args.query, &filter).await?;

    if hits.is_empty() {
        println!("no matches for {:?}", args.query);
    }
    for hit in &hits {
        let conversation = &hit.conversation;
        println!(
            "{}  {:10}  {}",
            conversation.updated_at.format("%Y-%m-%d %H:%M"),
            conversation.key.bot,
            if conversation.title.is_empty() {
                conversation.key.conversation.0.as_str()
            } else {
                conversation.title.as_str()
            },
        );
    }

    store.close().await
}
