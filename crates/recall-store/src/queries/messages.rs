// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message read operations.
//!
//! Message writes only happen inside `upsert_conversation`'s transaction;
//! there is deliberately no standalone message insert.

use recall_core::types::{BotId, ConversationId, Message};
use recall_core::RecallError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::queries::{parse_role, parse_ts};

/// Messages of one conversation in display order: timestamp first, remote
/// sequence position as the tiebreak.
pub async fn messages_for(
    db: &Database,
    bot: &BotId,
    conversation: &ConversationId,
) -> Result<Vec<Message>, RecallError> {
    let bot = bot.0.clone();
    let remote_id = conversation.0.clone();
    db.connection()
        .call(move |conn| {
            let pk: Option<i64> = conn
                .query_row(
                    "SELECT id FROM conversations WHERE bot = ?1 AND remote_id = ?2",
                    params![bot, remote_id],
                    |row| row.get(0),
                )
                .optional()?;
            match pk {
                Some(pk) => messages_by_conversation_pk(conn, pk),
                None => Ok(Vec::new()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Shared projection used by `messages_for` and `get_conversation`.
pub(crate) fn messages_by_conversation_pk(
    conn: &rusqlite::Connection,
    conversation_pk: i64,
) -> Result<Vec<Message>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT remote_id, role, content, created_at, seq
         FROM messages WHERE conversation_id = ?1
         ORDER BY created_at ASC, seq ASC",
    )?;
    let messages = stmt
        .query_map([conversation_pk], |row| {
            Ok(Message {
                id: row.get(0)?,
                role: parse_role(1, row.get(1)?)?,
                content: row.get(2)?,
                created_at: parse_ts(3, row.get(3)?)?,
                seq: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(messages)
}
