// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-bot sync checkpoints.
//!
//! A checkpoint is only written after a bot's batch was fully attempted,
//! so a crash mid-batch replays the batch on the next run (safe: upserts
//! are idempotent).

use chrono::{DateTime, Utc};
use recall_core::types::BotId;
use recall_core::RecallError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::queries::{format_ts, parse_ts};

/// Last successfully completed sync position for one bot.
pub async fn get_checkpoint(
    db: &Database,
    bot: &BotId,
) -> Result<Option<DateTime<Utc>>, RecallError> {
    let bot = bot.0.clone();
    db.connection()
        .call(move |conn| {
            let checkpoint = conn
                .query_row(
                    "SELECT last_synced_at FROM checkpoints WHERE bot = ?1",
                    params![bot],
                    |row| parse_ts(0, row.get(0)?),
                )
                .optional()?;
            Ok(checkpoint)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Advances (or creates) one bot's checkpoint.
pub async fn put_checkpoint(
    db: &Database,
    bot: &BotId,
    last_synced_at: DateTime<Utc>,
) -> Result<(), RecallError> {
    let bot = bot.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO checkpoints (bot, last_synced_at, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(bot) DO UPDATE SET
                     last_synced_at = excluded.last_synced_at,
                     updated_at = excluded.updated_at",
                params![bot, format_ts(&last_synced_at)],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
