// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-text search over message content.
//!
//! Queries are tokenized with the same alphanumeric, case-insensitive rule
//! FTS5's default tokenizer applies to indexed content, then each token is
//! quoted before it reaches the MATCH expression. User input therefore
//! never meets the FTS query parser raw; if the index still rejects an
//! expression the failure is logged and surfaced as an empty result set,
//! never as a crash.

use recall_core::RecallError;
use tracing::warn;

use crate::database::Database;
use crate::models::{ConversationFilter, SearchHit};
use crate::queries::{conversation_from_row, format_ts};

/// Builds a safe FTS5 MATCH expression: lowercased alphanumeric tokens,
/// each quoted, joined with implicit AND. Returns `None` when the input
/// contains no searchable tokens.
fn build_match_expr(raw: &str) -> Option<String> {
    let tokens: Vec<String> = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"", t.to_lowercase()))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Searches conversations whose messages match the query, ranked by best
/// BM25 score then recency. Bot and date filters intersect the text match;
/// pagination applies after ranking.
pub async fn search(
    db: &Database,
    query: &str,
    filter: &ConversationFilter,
) -> Result<Vec<SearchHit>, RecallError> {
    let Some(match_expr) = build_match_expr(query) else {
        warn!(query, "search query contained no indexable tokens");
        return Ok(Vec::new());
    };

    let filter = filter.clone();
    let result: Result<Vec<SearchHit>, tokio_rusqlite::Error> = db
        .connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT c.bot, c.remote_id, c.title, c.created_at, c.updated_at, c.message_count,
                        MIN(bm25(messages_fts)) AS score
                 FROM messages_fts
                 JOIN messages m ON m.rowid = messages_fts.rowid
                 JOIN conversations c ON c.id = m.conversation_id
                 WHERE messages_fts MATCH ?",
            );
            let mut args: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(match_expr)];

            if let Some(bot) = &filter.bot {
                sql.push_str(" AND c.bot = ?");
                args.push(Box::new(bot.0.clone()));
            }
            if let Some(after) = &filter.updated_after {
                sql.push_str(" AND c.updated_at >= ?");
                args.push(Box::new(format_ts(after)));
            }
            if let Some(before) = &filter.updated_before {
                sql.push_str(" AND c.updated_at <= ?");
                args.push(Box::new(format_ts(before)));
            }
            sql.push_str(
                " GROUP BY c.id ORDER BY score ASC, c.updated_at DESC LIMIT ? OFFSET ?",
            );
            args.push(Box::new(filter.limit as i64));
            args.push(Box::new(filter.offset as i64));

            let mut stmt = conn.prepare(&sql)?;
            let arg_refs: Vec<&dyn rusqlite::types::ToSql> =
                args.iter().map(|a| a.as_ref()).collect();
            let hits = stmt
                .query_map(arg_refs.as_slice(), |row| {
                    Ok(SearchHit {
                        conversation: conversation_from_row(row)?,
                        score: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(hits)
        })
        .await;

    match result {
        Ok(hits) => Ok(hits),
        // A MATCH expression the index rejects is a degraded query, not a
        // storage failure: warn and return nothing.
        Err(e) if is_fts_rejection(&e) => {
            warn!(query, error = %e, "full-text index rejected the query");
            Ok(Vec::new())
        }
        Err(e) => Err(crate::database::map_tr_err(e)),
    }
}

/// Looks through the error chain for an FTS5 query rejection.
fn is_fts_rejection(e: &tokio_rusqlite::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = current {
        if let Some(sql) = err.downcast_ref::<rusqlite::Error>() {
            return match sql {
                rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                    let msg = msg.to_lowercase();
                    msg.contains("fts5") || msg.contains("match")
                }
                _ => false,
            };
        }
        current = err.source();
    }
    let rendered = e.to_string().to_lowercase();
    rendered.contains("fts5") || rendered.contains("malformed match")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_expr_quotes_and_lowercases_tokens() {
        assert_eq!(
            build_match_expr("Python AsyncIO"),
            Some("\"python\" \"asyncio\"".to_string())
        );
    }

    #[test]
    fn match_expr_strips_fts_operators() {
        // Raw FTS syntax would be a query error; after sanitizing it is a
        // plain token search.
        assert_eq!(
            build_match_expr("\"unbalanced AND (near:"),
            Some("\"unbalanced\" \"and\" \"near\"".to_string())
        );
    }

    #[test]
    fn match_expr_rejects_token_free_input() {
        assert_eq!(build_match_expr("  !!! ??? "), None);
        assert_eq!(build_match_expr(""), None);
    }
}
