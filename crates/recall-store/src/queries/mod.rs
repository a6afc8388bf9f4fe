// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod checkpoints;
pub mod conversations;
pub mod messages;

use chrono::{DateTime, Utc};
use recall_core::types::{BotId, Conversation, ConversationId, ConversationKey, Role};

/// Canonical timestamp text: RFC 3339 with millisecond precision and a
/// trailing `Z`, lexicographically ordered so date-range filters can
/// compare as strings.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(crate) fn parse_ts(idx: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_role(idx: usize, raw: String) -> Result<Role, rusqlite::Error> {
    raw.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Maps a `bot, remote_id, title, created_at, updated_at, message_count`
/// projection to a [`Conversation`].
pub(crate) fn conversation_from_row(row: &rusqlite::Row<'_>) -> Result<Conversation, rusqlite::Error> {
    conversation_from_row_at(row, 0)
}

/// Same projection starting at column `offset`, for queries that select
/// extra leading columns.
pub(crate) fn conversation_from_row_at(
    row: &rusqlite::Row<'_>,
    offset: usize,
) -> Result<Conversation, rusqlite::Error> {
    Ok(Conversation {
        key: ConversationKey {
            bot: BotId(row.get(offset)?),
            conversation: ConversationId(row.get(offset + 1)?),
        },
        title: row.get(offset + 2)?,
        created_at: parse_ts(offset + 3, row.get(offset + 3)?)?,
        updated_at: parse_ts(offset + 4, row.get(offset + 4)?)?,
        message_count: row.get(offset + 5)?,
    })
}
