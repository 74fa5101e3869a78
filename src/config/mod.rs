//! Key-value configuration storage backed by SQLite, and the settings
//! resolved from it.
//!
//! Shares a database with [`SqliteStore`](crate::store::sqlite::SqliteStore)
//! and [`SqliteQuestionPool`](crate::questions::sqlite::SqliteQuestionPool).
//! A value given on the command line beats a stored value, which beats the
//! built-in default.

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use crate::consts::{DEFAULT_ACTION_INPUT_MIN_LEN, DEFAULT_LOOKUP_URL, DEFAULT_QUESTION_SEPARATOR};

pub const LOOKUP_URL: &str = "lookup_url";
pub const ACTION_INPUT_MIN_LEN: &str = "action_input_min_len";
pub const QUESTION_SEPARATOR: &str = "question_separator";
pub const STORE_QUESTION: &str = "store_question";

/// Every key `scribe config` accepts.
pub const KEYS: &[&str] = &[
    LOOKUP_URL,
    ACTION_INPUT_MIN_LEN,
    QUESTION_SEPARATOR,
    STORE_QUESTION,
];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the config table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open config database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("config lock poisoned"))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Set a known key (upsert). The value must parse for that key.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        validate(key, value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        LOOKUP_URL | QUESTION_SEPARATOR => Ok(()),
        ACTION_INPUT_MIN_LEN => parse_min_len(value).map(|_| ()),
        STORE_QUESTION => parse_bool(value).map(|_| ()),
        _ => bail!("unknown config key: {key} (known: {})", KEYS.join(", ")),
    }
}

fn parse_min_len(value: &str) -> Result<usize> {
    let n: usize = value
        .trim()
        .parse()
        .with_context(|| format!("{ACTION_INPUT_MIN_LEN} must be a number, got {value:?}"))?;
    if n == 0 {
        bail!("{ACTION_INPUT_MIN_LEN} must be at least 1");
    }
    Ok(n)
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{STORE_QUESTION} must be true or false, got {value:?}"),
    }
}

/// Values from the command line. `None` defers to the store.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub lookup_url: Option<String>,
    pub action_input_min_len: Option<usize>,
    pub separator: Option<String>,
    pub store_question: Option<bool>,
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lookup_url: String,
    pub action_input_min_len: usize,
    pub separator: String,
    pub store_question: bool,
}

impl Settings {
    pub fn resolve(overrides: &Overrides, config: &Config) -> Result<Self> {
        let lookup_url = match &overrides.lookup_url {
            Some(url) => url.clone(),
            None => config
                .get(LOOKUP_URL)?
                .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
        };

        let action_input_min_len = match overrides.action_input_min_len {
            Some(n) => n.max(1),
            None => match config.get(ACTION_INPUT_MIN_LEN)? {
                Some(v) => parse_min_len(&v)?,
                None => DEFAULT_ACTION_INPUT_MIN_LEN,
            },
        };

        let separator = match &overrides.separator {
            Some(s) => s.clone(),
            None => config
                .get(QUESTION_SEPARATOR)?
                .unwrap_or_else(|| DEFAULT_QUESTION_SEPARATOR.to_string()),
        };

        let store_question = match overrides.store_question {
            Some(b) => b,
            None => match config.get(STORE_QUESTION)? {
                Some(v) => parse_bool(&v)?,
                None => true,
            },
        };

        Ok(Self {
            lookup_url,
            action_input_min_len,
            separator,
            store_question,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let config = mem_config();
        assert!(config.get(LOOKUP_URL).unwrap().is_none());
    }

    #[test]
    fn set_overwrites_existing() {
        let config = mem_config();
        config.set(LOOKUP_URL, "http://old").unwrap();
        config.set(LOOKUP_URL, "http://new").unwrap();
        assert_eq!(config.get(LOOKUP_URL).unwrap().unwrap(), "http://new");
    }

    #[test]
    fn remove_nonexistent_is_ok() {
        let config = mem_config();
        config.remove(QUESTION_SEPARATOR).unwrap();
    }

    #[test]
    fn set_rejects_unknown_key() {
        let err = mem_config().set("theme", "dark").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }

    #[test]
    fn set_rejects_bad_values() {
        let config = mem_config();
        assert!(config.set(ACTION_INPUT_MIN_LEN, "three").is_err());
        assert!(config.set(ACTION_INPUT_MIN_LEN, "0").is_err());
        assert!(config.set(STORE_QUESTION, "maybe").is_err());
        assert!(config.get(ACTION_INPUT_MIN_LEN).unwrap().is_none());
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings = Settings::resolve(&Overrides::default(), &mem_config()).unwrap();
        assert_eq!(settings.lookup_url, DEFAULT_LOOKUP_URL);
        assert_eq!(settings.action_input_min_len, 1);
        assert_eq!(settings.separator, "#");
        assert!(settings.store_question);
    }

    #[test]
    fn stored_values_beat_defaults() {
        let config = mem_config();
        config.set(ACTION_INPUT_MIN_LEN, "3").unwrap();
        config.set(STORE_QUESTION, "off").unwrap();
        let settings = Settings::resolve(&Overrides::default(), &config).unwrap();
        assert_eq!(settings.action_input_min_len, 3);
        assert!(!settings.store_question);
    }

    #[test]
    fn overrides_beat_stored_values() {
        let config = mem_config();
        config.set(LOOKUP_URL, "http://stored").unwrap();
        config.set(QUESTION_SEPARATOR, "|").unwrap();
        let overrides = Overrides {
            lookup_url: Some("http://flag".to_string()),
            separator: Some("#".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&overrides, &config).unwrap();
        assert_eq!(settings.lookup_url, "http://flag");
        assert_eq!(settings.separator, "#");
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config-test.db");
        let path_str = path.to_str().unwrap();

        {
            let config = Config::open(path_str).unwrap();
            config.set(LOOKUP_URL, "http://persisted").unwrap();
        }

        let config = Config::open(path_str).unwrap();
        assert_eq!(config.get(LOOKUP_URL).unwrap().unwrap(), "http://persisted");
    }
}
