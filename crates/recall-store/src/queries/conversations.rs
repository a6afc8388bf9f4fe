// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation upsert and read operations.
//!
//! `upsert_conversation` is the single write path for synced data: the
//! conversation row, its message rows, and (through the schema triggers)
//! the FTS entries commit in one transaction or not at all.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use recall_core::types::{BotId, Conversation, ConversationId, Message};
use recall_core::RecallError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::models::{BotStats, ConversationFilter, StoreStats, UpsertOutcome};
use crate::queries::{conversation_from_row, format_ts};

/// Inserts or updates one conversation and its messages atomically.
///
/// Messages are keyed by (conversation, remote message id); re-upserting
/// the same history is a no-op reported as [`UpsertOutcome::Unchanged`].
/// `message_count` is recomputed from the rows actually present inside the
/// same transaction, so a reader can never observe a count that disagrees
/// with the stored messages.
pub async fn upsert_conversation(
    db: &Database,
    conversation: &Conversation,
    messages: &[Message],
) -> Result<UpsertOutcome, RecallError> {
    let conv = conversation.clone();
    let msgs = messages.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing: Option<(i64, String, String, i64)> = tx
                .query_row(
                    "SELECT id, title, updated_at, message_count
                     FROM conversations WHERE bot = ?1 AND remote_id = ?2",
                    params![conv.key.bot.0, conv.key.conversation.0],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;

            let (conversation_pk, inserted) = match &existing {
                None => {
                    tx.execute(
                        "INSERT INTO conversations (bot, remote_id, title, created_at, updated_at, message_count)
                         VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                        params![
                            conv.key.bot.0,
                            conv.key.conversation.0,
                            conv.title,
                            format_ts(&conv.created_at),
                            format_ts(&conv.updated_at),
                        ],
                    )?;
                    (tx.last_insert_rowid(), true)
                }
                Some((id, _, _, _)) => (*id, false),
            };

            let mut new_messages = 0usize;
            for msg in &msgs {
                new_messages += tx.execute(
                    "INSERT OR IGNORE INTO messages (conversation_id, remote_id, role, content, created_at, seq)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        conversation_pk,
                        msg.id,
                        msg.role.to_string(),
                        msg.content,
                        format_ts(&msg.created_at),
                        msg.seq,
                    ],
                )?;
            }

            let stored_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                [conversation_pk],
                |row| row.get(0),
            )?;

            let metadata_changed = match &existing {
                None => true,
                Some((_, title, updated_at, message_count)) => {
                    *title != conv.title
                        || *updated_at != format_ts(&conv.updated_at)
                        || *message_count != stored_count
                }
            };

            if metadata_changed {
                tx.execute(
                    "UPDATE conversations SET title = ?1, updated_at = ?2, message_count = ?3 WHERE id = ?4",
                    params![
                        conv.title,
                        format_ts(&conv.updated_at),
                        stored_count,
                        conversation_pk,
                    ],
                )?;
            }

            tx.commit()?;

            Ok(if inserted {
                UpsertOutcome::Inserted
            } else if new_messages > 0 || metadata_changed {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Unchanged
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Lists conversations matching the filter, newest activity first.
pub async fn list_conversations(
    db: &Database,
    filter: &ConversationFilter,
) -> Result<Vec<Conversation>, RecallError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT bot, remote_id, title, created_at, updated_at, message_count FROM conversations",
            );
            let mut clauses: Vec<&str> = Vec::new();
            let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(bot) = &filter.bot {
                clauses.push("bot = ?");
                args.push(Box::new(bot.0.clone()));
            }
            if let Some(after) = &filter.updated_after {
                clauses.push("updated_at >= ?");
                args.push(Box::new(format_ts(after)));
            }
            if let Some(before) = &filter.updated_before {
                clauses.push("updated_at <= ?");
                args.push(Box::new(format_ts(before)));
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY updated_at DESC LIMIT ? OFFSET ?");
            args.push(Box::new(filter.limit as i64));
            args.push(Box::new(filter.offset as i64));

            let mut stmt = conn.prepare(&sql)?;
            let arg_refs: Vec<&dyn rusqlite::types::ToSql> =
                args.iter().map(|a| a.as_ref()).collect();
            let conversations = stmt
                .query_map(arg_refs.as_slice(), conversation_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(conversations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetches one conversation with its full message history.
pub async fn get_conversation(
    db: &Database,
    bot: &BotId,
    conversation: &ConversationId,
) -> Result<Option<(Conversation, Vec<Message>)>, RecallError> {
    let bot = bot.0.clone();
    let remote_id = conversation.0.clone();
    db.connection()
        .call(move |conn| {
            let found: Option<(i64, Conversation)> = conn
                .query_row(
                    "SELECT id, bot, remote_id, title, created_at, updated_at, message_count
                     FROM conversations WHERE bot = ?1 AND remote_id = ?2",
                    params![bot, remote_id],
                    |row| {
                        let id: i64 = row.get(0)?;
                        let conv = crate::queries::conversation_from_row_at(row, 1)?;
                        Ok((id, conv))
                    },
                )
                .optional()?;

            let Some((conversation_pk, conversation)) = found else {
                return Ok(None);
            };

            let messages =
                crate::queries::messages::messages_by_conversation_pk(conn, conversation_pk)?;
            Ok(Some((conversation, messages)))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Returns the (remote id -> stored update marker) map for one bot, used
/// by the sync engine to diff remote listings against local state.
pub async fn known_conversations(
    db: &Database,
    bot: &BotId,
) -> Result<HashMap<ConversationId, DateTime<Utc>>, RecallError> {
    let bot = bot.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT remote_id, updated_at FROM conversations WHERE bot = ?1",
            )?;
            let pairs = stmt
                .query_map(params![bot], |row| {
                    let id: String = row.get(0)?;
                    let updated_at = crate::queries::parse_ts(1, row.get(1)?)?;
                    Ok((ConversationId(id), updated_at))
                })?
                .collect::<Result<HashMap<_, _>, _>>()?;
            Ok(pairs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Archive-wide and per-bot row counts.
pub async fn stats(db: &Database) -> Result<StoreStats, RecallError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.bot, COUNT(DISTINCT c.id), COUNT(m.remote_id)
                 FROM conversations c
                 LEFT JOIN messages m ON m.conversation_id = c.id
                 GROUP BY c.bot ORDER BY c.bot",
            )?;
            let per_bot = stmt
                .query_map([], |row| {
                    Ok(BotStats {
                        bot: BotId(row.get(0)?),
                        conversations: row.get::<_, i64>(1)? as u64,
                        messages: row.get::<_, i64>(2)? as u64,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let conversations = per_bot.iter().map(|b| b.conversations).sum();
            let messages = per_bot.iter().map(|b| b.messages).sum();
            Ok(StoreStats {
                conversations,
                messages,
                per_bot,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}
