//! The editable step form and its validation.
//!
//! The form has two shapes selected by the `final` toggle. Validation is
//! exhaustive for the active shape: every failing field is reported, and
//! a passing form yields a [`StepDraft`] of the matching variant.

use std::fmt;

use crate::consts::{DEFAULT_ACTION_INPUT_MIN_LEN, THOUGHT_MIN_LEN};
use crate::step::{ActionStep, FinalStep, Tool};

/// Length limits applied during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub thought_min_len: usize,
    pub action_input_min_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            thought_min_len: THOUGHT_MIN_LEN,
            action_input_min_len: DEFAULT_ACTION_INPUT_MIN_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Thought,
    Action,
    ActionInput,
    WikipediaAnswer,
    WikidataAnswer,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Thought => "thought",
            Field::Action => "action",
            Field::ActionInput => "actionInput",
            Field::WikipediaAnswer => "wikipediaAnswer",
            Field::WikidataAnswer => "wikidataAnswer",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every field that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(|e| e.field).collect()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated step, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDraft {
    /// `observation` is always `None` here.
    Action(ActionStep),
    Final(FinalStep),
}

/// Field values for the step being composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepForm {
    thought: String,
    action: Option<Tool>,
    action_input: String,
    wikipedia_answer: String,
    wikidata_answer: String,
    is_final: bool,
}

impl StepForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thought(&self) -> &str {
        &self.thought
    }

    pub fn action(&self) -> Option<Tool> {
        self.action
    }

    pub fn action_input(&self) -> &str {
        &self.action_input
    }

    pub fn wikipedia_answer(&self) -> &str {
        &self.wikipedia_answer
    }

    pub fn wikidata_answer(&self) -> &str {
        &self.wikidata_answer
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn set_thought(&mut self, value: impl Into<String>) {
        self.thought = value.into();
    }

    pub fn set_action(&mut self, tool: Option<Tool>) {
        self.action = tool;
    }

    pub fn set_action_input(&mut self, value: impl Into<String>) {
        self.action_input = value.into();
    }

    pub fn set_wikipedia_answer(&mut self, value: impl Into<String>) {
        self.wikipedia_answer = value.into();
    }

    pub fn set_wikidata_answer(&mut self, value: impl Into<String>) {
        self.wikidata_answer = value.into();
    }

    /// Switch between the action shape and the final-answer shape.
    /// Values typed into the hidden shape are kept but not validated.
    pub fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }

    /// True once any field holds a value.
    pub fn is_dirty(&self) -> bool {
        !self.thought.is_empty()
            || self.action.is_some()
            || !self.action_input.is_empty()
            || !self.wikipedia_answer.is_empty()
            || !self.wikidata_answer.is_empty()
    }

    /// The action shape cannot be submitted until a tool is chosen,
    /// regardless of the other fields.
    pub fn awaiting_action(&self) -> bool {
        !self.is_final && self.action.is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Length checks use trimmed text; the draft keeps the text as typed.
    pub fn validate(&self, rules: &ValidationRules) -> Result<StepDraft, ValidationErrors> {
        let mut errors = Vec::new();

        if self.thought.trim().chars().count() < rules.thought_min_len {
            errors.push(FieldError {
                field: Field::Thought,
                message: format!(
                    "Thought must be at least {} characters.",
                    rules.thought_min_len
                ),
            });
        }

        if self.is_final {
            if self.wikipedia_answer.trim().is_empty() {
                errors.push(FieldError {
                    field: Field::WikipediaAnswer,
                    message: "Please enter the Wikipedia answer".to_string(),
                });
            }
            if self.wikidata_answer.trim().is_empty() {
                errors.push(FieldError {
                    field: Field::WikidataAnswer,
                    message: "Please enter the Wikidata answer".to_string(),
                });
            }
            if !errors.is_empty() {
                return Err(ValidationErrors(errors));
            }
            return Ok(StepDraft::Final(FinalStep {
                thought: self.thought.clone(),
                wikipedia_answer: self.wikipedia_answer.clone(),
                wikidata_answer: self.wikidata_answer.clone(),
            }));
        }

        if self.action.is_none() {
            errors.push(FieldError {
                field: Field::Action,
                message: "Please select a tool".to_string(),
            });
        }
        let min = rules.action_input_min_len.max(1);
        if self.action_input.trim().chars().count() < min {
            let message = if min == 1 {
                "Please enter the tool's input".to_string()
            } else {
                format!("Action input must be at least {min} characters.")
            };
            errors.push(FieldError {
                field: Field::ActionInput,
                message,
            });
        }

        match self.action {
            Some(action) if errors.is_empty() => Ok(StepDraft::Action(ActionStep {
                thought: self.thought.clone(),
                action,
                action_input: self.action_input.clone(),
                observation: None,
            })),
            _ => Err(ValidationErrors(errors)),
        }
    }
}
