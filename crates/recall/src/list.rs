// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall list` -- archived conversations, newest first.

use clap::Args;
use recall_config::RecallConfig;
use recall_core::{BotId, RecallError};
use recall_store::{ConversationFilter, ConversationStore};

#[derive(Args)]
pub struct ListArgs {
    /// Restrict to one bot.
    #[arg(long)]
    pub bot: Option<String>,

    /// Maximum rows to print.
    #[arg(long, default_value_t = 25)]
    pub limit: u32,

    /// Rows to skip before printing.
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

pub async fn run(config: &RecallConfig, args: ListArgs) -> Result<(), RecallError> {
    let store = ConversationStore::open(&config.storage).await?;

    let filter = ConversationFilter {
        bot: args.bot.map(BotId),
        limit: args.limit,
        offset: args.offset,
        ..ConversationFilter::default()
    };
    let conversations = store.get_conversations(&filter).await?;

    if conversations.is_empty() {
        println!("no conversations in the archive");
    }
    for conversation in &conversations {
        println!(
            "{}  {:10}  {:4} msgs  {}",
            conversation.updated_at.format("%Y-%m-%d %H:%M"),
            conversation.key.bot,
            conversation.message_count,
            if conversation.title.is_empty() {
                conversation.key.conversation.0.as_str()
            } else {
                conversation.title.as_str()
            },
        );
    }

    store.close().await
}
