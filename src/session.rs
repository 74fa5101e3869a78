//! The annotation session: one question at a time, one step at a time.
//!
//! [`Session`] is the single writer of the active [`Trace`] and form.
//! Readers (the history view, the REPL prompt) borrow them through
//! accessors. A successful action step appends to the trace; a successful
//! final step writes the whole trace as one record, then clears it and
//! moves on.
//!
//! `submit` and `navigate` take `&mut self`, so nothing else can reach the
//! session while one of them awaits a collaborator. That borrow is the
//! in-flight guard; the REPL shows a spinner for its duration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::consts::DEFAULT_QUESTION_SEPARATOR;
use crate::form::{StepDraft, StepForm, ValidationErrors, ValidationRules};
use crate::lookup::{Lookup, LookupError, LookupRequest};
use crate::navigator::{Direction, Moved, Navigator};
use crate::questions::Question;
use crate::step::Step;
use crate::store::{TraceRecord, TraceStore};
use crate::trace::Trace;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub rules: ValidationRules,
    /// Placed between the question text and the input for context tools.
    pub separator: String,
    /// Include the question text in stored records.
    pub store_question: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rules: ValidationRules::default(),
            separator: DEFAULT_QUESTION_SEPARATOR.to_string(),
            store_question: true,
        }
    }
}

/// Why the submit control is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    NoAction,
}

impl std::fmt::Display for Blocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Blocked::NoAction => f.write_str("choose an action first"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid step: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("submit disabled: {0}")]
    SubmitDisabled(Blocked),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("failed to save trace: {0}")]
    Persistence(#[source] BoxError),
    #[error("failed to fetch next question: {0}")]
    QuestionPool(#[source] BoxError),
    #[error("no questions left")]
    Exhausted,
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// An action step was looked up and appended.
    Step { observation: String, trace_len: usize },
    /// The trace was stored. `steps` counts the records' action steps.
    Trace { steps: usize, next: NavOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(usize),
    /// Boundary reached or direction unsupported; nothing was reset.
    NoOp,
    /// The trace was saved but the pool could not supply the next
    /// question. The navigator stays put; `/next` retries the fetch.
    FetchFailed,
    /// Unsaved work would be lost. Retry with `confirmed = true`.
    NeedsConfirmation,
    Exhausted,
}

pub struct Session {
    navigator: Navigator,
    form: StepForm,
    trace: Trace,
    lookup: Arc<dyn Lookup>,
    store: Arc<dyn TraceStore>,
    config: SessionConfig,
}

impl Session {
    pub fn new(
        navigator: Navigator,
        lookup: Arc<dyn Lookup>,
        store: Arc<dyn TraceStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            navigator,
            form: StepForm::new(),
            trace: Trace::new(),
            lookup,
            store,
            config,
        }
    }

    pub fn question(&self) -> Option<&Question> {
        self.navigator.current()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn form(&self) -> &StepForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StepForm {
        &mut self.form
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// `Some` while the submit control should be disabled.
    pub fn submit_blocked(&self) -> Option<Blocked> {
        self.form.awaiting_action().then_some(Blocked::NoAction)
    }

    /// Leaving the question would discard typed fields or recorded steps.
    pub fn needs_confirmation(&self) -> bool {
        self.form.is_dirty() || !self.trace.is_empty()
    }

    /// Drop the form and the trace for the current question.
    pub fn discard(&mut self) {
        self.form.reset();
        self.trace = self.trace.clear();
    }

    /// Validate the form and submit it as an action or a final step.
    ///
    /// On any error the trace is exactly as it was before the call. Once a
    /// final record is stored the call succeeds; a failed fetch of the next
    /// question is reported as [`NavOutcome::FetchFailed`].
    pub async fn submit(&mut self) -> Result<Submitted, SessionError> {
        let Some(question) = self.navigator.current().map(|q| q.text.clone()) else {
            return Err(SessionError::Exhausted);
        };
        if let Some(reason) = self.submit_blocked() {
            return Err(SessionError::SubmitDisabled(reason));
        }

        match self.form.validate(&self.config.rules)? {
            StepDraft::Action(mut step) => {
                let request = LookupRequest::for_step(&step, &question, &self.config.separator);
                let observation = self
                    .lookup
                    .lookup(&request)
                    .await
                    .inspect_err(|e| warn!(action = %request.action, error = %e, "lookup failed"))?;

                step.observation = Some(observation.clone());
                self.trace = self.trace.append(step);
                self.form.reset();
                info!(
                    action = %request.action,
                    trace_len = self.trace.len(),
                    "step recorded"
                );
                Ok(Submitted::Step {
                    observation,
                    trace_len: self.trace.len(),
                })
            }
            StepDraft::Final(final_step) => {
                let steps = self.trace.len();
                let mut data: Vec<Step> = self.trace.iter().cloned().map(Step::Action).collect();
                data.push(Step::Final(final_step));
                let record = TraceRecord {
                    question: self.config.store_question.then_some(question),
                    data,
                };

                if let Err(e) = self.store.insert(&record).await {
                    let error = format!("{e:#}");
                    warn!(steps, %error, "failed to save trace");
                    return Err(SessionError::Persistence(e.into()));
                }

                info!(steps, index = self.navigator.index(), "trace saved");
                self.discard();
                let next = match self.step_to(Direction::Next).await {
                    Ok(next) => next,
                    Err(e) => {
                        warn!(error = %e, "trace saved but the next question is unavailable");
                        NavOutcome::FetchFailed
                    }
                };
                Ok(Submitted::Trace { steps, next })
            }
        }
    }

    /// Move to another question, resetting the form and the trace.
    ///
    /// Unsaved work is only discarded when `confirmed` is set; otherwise
    /// [`NavOutcome::NeedsConfirmation`] is returned and nothing changes.
    /// A failed pool fetch also leaves the form and the trace untouched.
    pub async fn navigate(
        &mut self,
        direction: Direction,
        confirmed: bool,
    ) -> Result<NavOutcome, SessionError> {
        if self.navigator.is_exhausted() {
            return Err(SessionError::Exhausted);
        }
        if !self.navigator.can_move(direction) {
            debug!(?direction, index = self.navigator.index(), "navigation is a no-op");
            return Ok(NavOutcome::NoOp);
        }
        if self.needs_confirmation() && !confirmed {
            return Ok(NavOutcome::NeedsConfirmation);
        }
        let outcome = self.step_to(direction).await?;
        self.discard();
        Ok(outcome)
    }

    async fn step_to(&mut self, direction: Direction) -> Result<NavOutcome, SessionError> {
        let moved = self
            .navigator
            .advance(direction)
            .await
            .map_err(|e| SessionError::QuestionPool(e.into()))?;
        Ok(match moved {
            Moved::To(index) => NavOutcome::Moved(index),
            Moved::Stayed => NavOutcome::NoOp,
            Moved::Exhausted => NavOutcome::Exhausted,
        })
    }
}
