// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes: the
//! `Database` struct IS the single writer, and every query module accepts
//! `&Database` and goes through `connection().call()`.

use recall_config::model::StorageConfig;
use recall_core::RecallError;
use tracing::debug;

/// Handle to the single serialized SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database, runs all pending
    /// migrations, and applies the connection pragmas.
    pub async fn open(config: &StorageConfig) -> Result<Self, RecallError> {
        let path = std::path::PathBuf::from(&config.database_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(RecallError::storage)?;
            }
        }

        // Migrations run on a short-lived blocking connection before the
        // serialized handle opens; refinery drives plain rusqlite.
        let migration_path = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecallError> {
            let mut conn =
                rusqlite::Connection::open(&migration_path).map_err(RecallError::storage)?;
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| RecallError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        let journal_mode = if config.wal_mode { "WAL" } else { "DELETE" };
        let pragmas = format!(
            "PRAGMA journal_mode={journal_mode};\n\
             PRAGMA synchronous=NORMAL;\n\
             PRAGMA foreign_keys=ON;\n\
             PRAGMA busy_timeout={};",
            config.busy_timeout_ms
        );
        conn.call(move |conn| {
            conn.execute_batch(&pragmas)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %config.database_path, wal = config.wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying serialized connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL; the connection itself closes on drop.
    pub async fn close(self) -> Result<(), RecallError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Converts tokio-rusqlite errors, surfacing SQLITE_BUSY/LOCKED as the
/// retryable [`RecallError::StorageBusy`] condition.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> RecallError {
    if is_busy(&e) {
        return RecallError::StorageBusy;
    }
    RecallError::Storage {
        source: Box::new(e),
    }
}

/// Walks the error chain looking for a busy/locked SQLite failure.
fn is_busy(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = current {
        if let Some(sql) = err.downcast_ref::<rusqlite::Error>() {
            if let rusqlite::Error::SqliteFailure(code, _) = sql {
                return matches!(
                    code.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                );
            }
            return false;
        }
        current = err.source();
    }
    // Fallback when the wrapper hides the chain.
    e.to_string().contains("database is locked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }
    }

    #[tokio::test]
    async fn open_creates_the_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("archive.db");
        let db = Database::open(&make_config(&db_path)).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/archive.db");
        let db = Database::open(&make_config(&db_path)).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent_across_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("archive.db");

        let db = Database::open(&make_config(&db_path)).await.unwrap();
        db.close().await.unwrap();

        // Second open re-runs the migration runner against an up-to-date schema.
        let db = Database::open(&make_config(&db_path)).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn schema_has_the_expected_tables() {
        let dir = tempdir().unwrap();
        let db = Database::open(&make_config(&dir.path().join("archive.db")))
            .await
            .unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type IN ('table', 'trigger') ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap();

        for expected in [
            "conversations",
            "messages",
            "messages_fts",
            "checkpoints",
            "messages_ai",
            "messages_ad",
            "messages_au",
        ] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing {expected}, got {tables:?}"
            );
        }

        db.close().await.unwrap();
    }

    #[test]
    fn busy_detection_matches_sqlite_busy_codes() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        assert!(is_busy(&busy));

        let other = rusqlite::Error::QueryReturnedNoRows;
        assert!(!is_busy(&other));
    }
}
