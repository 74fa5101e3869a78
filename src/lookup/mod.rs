pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;

use crate::step::{ActionStep, Tool};

/// Body sent to the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
    pub action: Tool,
    pub action_input: String,
}

impl LookupRequest {
    /// Build the request for a step asked against `question`.
    ///
    /// Context tools get `<question><separator><input>`; every other tool
    /// gets the input verbatim.
    pub fn for_step(step: &ActionStep, question: &str, separator: &str) -> Self {
        let action_input = if step.action.needs_question_context() {
            format!("{question}{separator}{}", step.action_input)
        } else {
            step.action_input.clone()
        };
        Self {
            action: step.action,
            action_input,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The service answered with a non-2xx status.
    #[error("lookup service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("lookup request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("malformed lookup response: {0}")]
    Malformed(String),
}

/// Turns a tool call into an observation. HTTP in production, scripted in tests.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self, request: &LookupRequest) -> Result<String, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTION: &str = "Peter Quill... born in which U.S. state?";

    fn step(action: Tool, input: &str) -> ActionStep {
        ActionStep {
            thought: "Looking for birth state".to_string(),
            action,
            action_input: input.to_string(),
            observation: None,
        }
    }

    #[test]
    fn context_tool_is_prefixed() {
        let req = LookupRequest::for_step(
            &step(Tool::WikiSearch, "Guardians of the Galaxy Quill"),
            QUESTION,
            "#",
        );
        assert_eq!(
            req.action_input,
            "Peter Quill... born in which U.S. state?#Guardians of the Galaxy Quill"
        );
        assert_eq!(req.action, Tool::WikiSearch);
    }

    #[test]
    fn every_tool_follows_prefix_rule() {
        for tool in Tool::ALL {
            let req = LookupRequest::for_step(&step(tool, "input"), QUESTION, "#");
            if tool.needs_question_context() {
                assert_eq!(req.action_input, format!("{QUESTION}#input"));
            } else {
                assert_eq!(req.action_input, "input");
            }
        }
    }

    #[test]
    fn separator_is_preserved_literally() {
        let req = LookupRequest::for_step(&step(Tool::GenerateSquall, "x"), "q", " || ");
        assert_eq!(req.action_input, "q || x");
    }

    #[test]
    fn request_serializes_snake_case_body() {
        let req = LookupRequest::for_step(&step(Tool::GetLabel, "Q42"), QUESTION, "#");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"action": "getLabel", "action_input": "Q42"})
        );
    }
}
