//! Project-wide constants.

use std::path::PathBuf;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Lookup endpoint used when neither the CLI nor the config store sets one.
pub const DEFAULT_LOOKUP_URL: &str = "http://127.0.0.1:8000/lookup";

/// Joins the question text and the typed input for context tools.
pub const DEFAULT_QUESTION_SEPARATOR: &str = "#";

/// Minimum thought length, in characters.
pub const THOUGHT_MIN_LEN: usize = 10;

/// Minimum action input length, in characters. Deployments differ (1 or 3).
pub const DEFAULT_ACTION_INPUT_MIN_LEN: usize = 1;

/// Seconds before a lookup request is abandoned as a transport failure.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 60;

/// Built-in question list for static mode.
pub const STATIC_QUESTIONS: &[&str] = &[
    "Peter Quill in Guardians of the Galaxy was born in which U.S. state?",
    "Who is the president of India?",
];

/// Default database path: `~/.scribe/scribe.db`.
/// Single DB for traces, the question pool, and config.
/// Falls back to the working directory when there is no home directory.
pub fn default_db_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".scribe").join("scribe.db"),
        None => PathBuf::from("scribe.db"),
    }
}

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
