use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, params};
use std::sync::{Mutex, MutexGuard};

use super::{TraceRecord, TraceStore};

/// SQLite-backed trace storage. One row per submitted trace.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open trace database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS traces (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (datetime('now')),
                question TEXT,
                data TEXT NOT NULL
            );",
        )
        .context("failed to create traces table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("trace store lock poisoned"))
    }
}

#[async_trait]
impl TraceStore for SqliteStore {
    async fn insert(&self, record: &TraceRecord) -> Result<()> {
        let data = serde_json::to_string(&record.data)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO traces (question, data) VALUES (?1, ?2)",
            params![record.question, data],
        )?;
        Ok(())
    }

    async fn records(&self) -> Result<Vec<TraceRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT question, data FROM traces ORDER BY id ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(question, data)| {
                Ok(TraceRecord {
                    question,
                    data: serde_json::from_str(&data)?,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM traces", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}
