//! Which question is active, and how to get to the next one.
//!
//! A static list can be walked both ways and stops at either end. A pool
//! only moves forward; when it runs dry the navigator is `Exhausted` for
//! good.

use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::debug;

use crate::questions::{Question, QuestionPool, StaticQuestions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Result of [`Navigator::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moved {
    To(usize),
    /// At a boundary, or the direction is not supported; nothing changed.
    Stayed,
    /// The pool had nothing left.
    Exhausted,
}

enum Source {
    Static(StaticQuestions),
    Pooled(Arc<dyn QuestionPool>),
}

enum State {
    Idle { index: usize, question: Question },
    Exhausted { index: usize },
}

pub struct Navigator {
    source: Source,
    state: State,
}

impl Navigator {
    /// Start at the first question of a non-empty list.
    pub fn with_static(questions: StaticQuestions) -> Result<Self> {
        let Some(question) = questions.get(0) else {
            bail!("question list is empty");
        };
        Ok(Self {
            source: Source::Static(questions),
            state: State::Idle { index: 0, question },
        })
    }

    /// Start at the first question fetched from `pool`. An empty pool
    /// yields a navigator that is already exhausted.
    pub async fn pooled(pool: Arc<dyn QuestionPool>) -> Result<Self> {
        let state = match pool.next_unused().await? {
            Some(question) => State::Idle { index: 0, question },
            None => State::Exhausted { index: 0 },
        };
        Ok(Self {
            source: Source::Pooled(pool),
            state,
        })
    }

    pub fn index(&self) -> usize {
        match &self.state {
            State::Idle { index, .. } | State::Exhausted { index } => *index,
        }
    }

    /// `None` once exhausted.
    pub fn current(&self) -> Option<&Question> {
        match &self.state {
            State::Idle { question, .. } => Some(question),
            State::Exhausted { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted { .. })
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.source, Source::Pooled(_))
    }

    /// Number of questions in static mode; `None` for a pool.
    pub fn total(&self) -> Option<usize> {
        match &self.source {
            Source::Static(qs) => Some(qs.len()),
            Source::Pooled(_) => None,
        }
    }

    /// Whether [`advance`](Self::advance) would change anything.
    pub fn can_move(&self, direction: Direction) -> bool {
        let State::Idle { index, .. } = self.state else {
            return false;
        };
        match (&self.source, direction) {
            (Source::Static(qs), Direction::Next) => index + 1 < qs.len(),
            (Source::Static(_), Direction::Previous) => index > 0,
            (Source::Pooled(_), Direction::Next) => true,
            (Source::Pooled(_), Direction::Previous) => false,
        }
    }

    /// Move one question in `direction`. A failed pool fetch leaves the
    /// navigator where it was.
    pub async fn advance(&mut self, direction: Direction) -> Result<Moved> {
        if !self.can_move(direction) {
            return Ok(Moved::Stayed);
        }
        let index = self.index();
        let target = match direction {
            Direction::Next => index + 1,
            Direction::Previous => index - 1,
        };

        let next = match &self.source {
            Source::Static(qs) => qs.get(target),
            Source::Pooled(pool) => pool.next_unused().await?,
        };

        match next {
            Some(question) => {
                debug!(from = index, to = target, "question changed");
                self.state = State::Idle {
                    index: target,
                    question,
                };
                Ok(Moved::To(target))
            }
            None if self.is_pooled() => {
                debug!(index, "question pool exhausted");
                self.state = State::Exhausted { index };
                Ok(Moved::Exhausted)
            }
            None => Ok(Moved::Stayed),
        }
    }
}
