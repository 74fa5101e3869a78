//! Question sources: a fixed ordered list, or a pool of unused questions.

pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::consts::STATIC_QUESTIONS;

/// A prompt the annotator answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Position in a static list, or the pool's row id.
    pub id: i64,
    pub text: String,
}

/// Hands out questions nobody has answered yet.
///
/// Marking a question as used is the pool's business; callers only fetch.
#[async_trait]
pub trait QuestionPool: Send + Sync {
    /// `None` once the pool has run dry.
    async fn next_unused(&self) -> Result<Option<Question>>;
}

/// An ordered, in-memory question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticQuestions {
    questions: Vec<String>,
}

impl StaticQuestions {
    pub fn new(questions: Vec<String>) -> Self {
        Self { questions }
    }

    pub fn builtin() -> Self {
        Self::new(STATIC_QUESTIONS.iter().map(|q| q.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Question> {
        self.questions.get(index).map(|text| Question {
            id: index as i64,
            text: text.clone(),
        })
    }
}

impl Default for StaticQuestions {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list_matches_consts() {
        let qs = StaticQuestions::builtin();
        assert_eq!(qs.len(), STATIC_QUESTIONS.len());
        assert_eq!(qs.get(1).unwrap().text, STATIC_QUESTIONS[1]);
    }

    #[test]
    fn get_out_of_range_is_none() {
        let qs = StaticQuestions::new(vec!["only".to_string()]);
        assert!(qs.get(1).is_none());
        assert_eq!(qs.get(0).unwrap().id, 0);
    }
}
