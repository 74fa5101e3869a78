//! Question pool backed by SQLite.
//!
//! Shares a database with [`SqliteStore`](crate::store::sqlite::SqliteStore)
//! and [`Config`](crate::config::Config). Fetching a question marks it used
//! in the same transaction, so no two fetches return the same row. A
//! question skipped with `/next` or left behind on quit stays used.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

use super::{Question, QuestionPool};

pub struct SqliteQuestionPool {
    conn: Mutex<Connection>,
}

impl SqliteQuestionPool {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open question database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                used INTEGER NOT NULL DEFAULT 0
            );",
        )
        .context("failed to create questions table")?;
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
            .map_err(|_| anyhow!("question pool lock poisoned"))
    }

    /// Add a question to the pool. Returns its id.
    pub fn add(&self, text: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO questions (text) VALUES (?1)", [text])?;
        Ok(conn.last_insert_rowid())
    }

    /// Add one question per non-blank line. Returns how many were added.
    pub fn import(&self, contents: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut added = 0;
        for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
            tx.execute("INSERT INTO questions (text) VALUES (?1)", [line])?;
            added += 1;
        }
        tx.commit()?;
        Ok(added)
    }

    /// Number of questions not handed out yet.
    pub fn remaining(&self) -> Result<u64> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE used = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

#[async_trait]
impl QuestionPool for SqliteQuestionPool {
    async fn next_unused(&self) -> Result<Option<Question>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let question = tx
            .query_row(
                "SELECT id, text FROM questions WHERE used = 0 ORDER BY id ASC LIMIT 1",
                [],
                |row| {
                    Ok(Question {
                        id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;
        if let Some(q) = &question {
            tx.execute("UPDATE questions SET used = 1 WHERE id = ?1", [q.id])?;
        }
        tx.commit()?;
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_pool_returns_none() {
        let pool = SqliteQuestionPool::in_memory().unwrap();
        assert!(pool.next_unused().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_returns_each_question_once_in_order() {
        let pool = SqliteQuestionPool::in_memory().unwrap();
        pool.add("first question").unwrap();
        pool.add("second question").unwrap();

        let a = pool.next_unused().await.unwrap().unwrap();
        let b = pool.next_unused().await.unwrap().unwrap();
        assert_eq!(a.text, "first question");
        assert_eq!(b.text, "second question");
        assert!(pool.next_unused().await.unwrap().is_none());
    }

    #[test]
    fn import_skips_blank_lines() {
        let pool = SqliteQuestionPool::in_memory().unwrap();
        let added = pool.import("one\n\n  two  \n\t\nthree\n").unwrap();
        assert_eq!(added, 3);
        assert_eq!(pool.remaining().unwrap(), 3);
    }

    #[tokio::test]
    async fn remaining_drops_after_fetch() {
        let pool = SqliteQuestionPool::in_memory().unwrap();
        pool.import("a\nb").unwrap();
        pool.next_unused().await.unwrap();
        assert_eq!(pool.remaining().unwrap(), 1);
    }

    #[tokio::test]
    async fn used_flag_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let path = path.to_str().unwrap();

        {
            let pool = SqliteQuestionPool::open(path).unwrap();
            pool.import("a\nb").unwrap();
            pool.next_unused().await.unwrap();
        }

        let pool = SqliteQuestionPool::open(path).unwrap();
        let next = pool.next_unused().await.unwrap().unwrap();
        assert_eq!(next.text, "b");
    }
}
