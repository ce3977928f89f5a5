//! SQLite signal store (read-only)
//!
//! Signals live in a `signals` table written by upstream producers. The
//! connection is opened read-only per fetch on a blocking thread, so the store
//! itself holds no connection and is freely shareable.

use super::{matches_selection, SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// DDL for the table this store reads; producers and tests use it
pub const SIGNALS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS signals (
    signal_id TEXT PRIMARY KEY,
    layer TEXT NOT NULL,
    timestamp_ms INTEGER NOT NULL,
    metric_type TEXT NOT NULL,
    value REAL NOT NULL,
    confidence REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_signals_timestamp ON signals(timestamp_ms);";

pub struct SqliteSignalStore {
    db_path: PathBuf,
}

impl SqliteSignalStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    fn read_signals(
        db_path: &Path,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(
            "SELECT signal_id, layer, timestamp_ms, metric_type, value, confidence
             FROM signals
             WHERE timestamp_ms >= ?1 AND timestamp_ms <= ?2
             ORDER BY timestamp_ms ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![window.start.timestamp_millis(), window.end.timestamp_millis()],
            |row| {
                let timestamp_ms: i64 = row.get(2)?;
                let timestamp = DateTime::<Utc>::from_timestamp_millis(timestamp_ms).ok_or_else(|| {
                    rusqlite::Error::IntegralValueOutOfRange(2, timestamp_ms)
                })?;

                Ok(Signal {
                    signal_id: row.get(0)?,
                    layer: row.get(1)?,
                    timestamp,
                    metric_type: row.get(3)?,
                    value: row.get(4)?,
                    confidence: row.get(5)?,
                })
            },
        )?;

        let mut signals = Vec::new();
        for row in rows {
            let signal = row?;
            if matches_selection(&signal, window, layers) {
                signals.push(signal);
            }
        }

        Ok(signals)
    }
}

#[async_trait]
impl SignalSource for SqliteSignalStore {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        let db_path = self.db_path.clone();
        let window = *window;
        let layers = layers.to_vec();

        let signals =
            tokio::task::spawn_blocking(move || Self::read_signals(&db_path, &window, &layers)).await??;

        log::debug!("📥 Read {} signals from {}", signals.len(), self.db_path.display());
        Ok(signals)
    }

    fn source_type(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn setup_test_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("signals.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(SIGNALS_SCHEMA).unwrap();

        (dir, db_path)
    }

    fn insert_signal(conn: &Connection, id: &str, layer: &str, ts: DateTime<Utc>, metric: &str, value: f64) {
        conn.execute(
            "INSERT INTO signals (signal_id, layer, timestamp_ms, metric_type, value, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, 0.9)",
            params![id, layer, ts.timestamp_millis(), metric, value],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_reads_window_and_layers() {
        let (_dir, db_path) = setup_test_db();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let conn = Connection::open(&db_path).unwrap();
        insert_signal(&conn, "s1", "observatory", base, "latency", 100.0);
        insert_signal(&conn, "s2", "cost-ops", base + Duration::minutes(5), "cost", 500.0);
        insert_signal(&conn, "s3", "observatory", base + Duration::minutes(10), "latency", 150.0);
        insert_signal(&conn, "s4", "observatory", base + Duration::hours(3), "latency", 200.0);
        drop(conn);

        let store = SqliteSignalStore::new(&db_path);
        let window = TimeWindow::new(base, base + Duration::hours(1));

        let all = store.fetch_signals(&window, &[]).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.signal_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(all[0].timestamp, base);

        let observatory = store
            .fetch_signals(&window, &["observatory".to_string()])
            .await
            .unwrap();
        assert_eq!(observatory.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_database_is_error() {
        let dir = tempdir().unwrap();
        let store = SqliteSignalStore::new(dir.path().join("absent.db"));
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let result = store.fetch_signals(&TimeWindow::new(base, base), &[]).await;

        assert!(matches!(result, Err(SignalSourceError::Database(_))));
    }

    #[test]
    fn test_connection_is_read_only() {
        let (_dir, db_path) = setup_test_db();
        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();

        let result = conn.execute(
            "INSERT INTO signals VALUES ('x', 'observatory', 0, 'latency', 1.0, 1.0)",
            [],
        );

        assert!(result.is_err());
    }
}
