//! The recorded units of a reasoning trace.
//!
//! A [`Step`] is either an [`ActionStep`] (thought + tool call + the
//! observation that came back) or a [`FinalStep`] carrying the answers.
//! On the wire the two are distinguished by an `isFinal` boolean.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The lookup tools an annotator can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "wikiSearch")]
    WikiSearch,
    #[serde(rename = "wikiSearchSummary")]
    WikiSearchSummary,
    #[serde(rename = "getWikidataID")]
    GetWikidataId,
    #[serde(rename = "generateSquall")]
    GenerateSquall,
    #[serde(rename = "runSparql")]
    RunSparql,
    #[serde(rename = "getLabel")]
    GetLabel,
    #[serde(rename = "squall2Sparql")]
    Squall2Sparql,
    #[serde(rename = "getObservation")]
    GetObservation,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::WikiSearch,
        Tool::Squall2Sparql,
        Tool::GetWikidataId,
        Tool::GenerateSquall,
        Tool::RunSparql,
        Tool::WikiSearchSummary,
        Tool::GetLabel,
        Tool::GetObservation,
    ];

    /// Identifier sent to the lookup service.
    pub fn id(self) -> &'static str {
        match self {
            Tool::WikiSearch => "wikiSearch",
            Tool::WikiSearchSummary => "wikiSearchSummary",
            Tool::GetWikidataId => "getWikidataID",
            Tool::GenerateSquall => "generateSquall",
            Tool::RunSparql => "runSparql",
            Tool::GetLabel => "getLabel",
            Tool::Squall2Sparql => "squall2Sparql",
            Tool::GetObservation => "getObservation",
        }
    }

    /// Human-readable name for menus.
    pub fn label(self) -> &'static str {
        match self {
            Tool::WikiSearch => "Wikipedia Search",
            Tool::WikiSearchSummary => "Wikipedia Search Summary",
            Tool::GetWikidataId => "Get Wikidata ID",
            Tool::GenerateSquall => "Generate Squall",
            Tool::RunSparql => "Run Sparql Query",
            Tool::GetLabel => "Get Label",
            Tool::Squall2Sparql => "Convert Squall to Sparql",
            Tool::GetObservation => "Get Observation from LLM",
        }
    }

    /// Tools whose input is prefixed with the active question text.
    pub fn needs_question_context(self) -> bool {
        matches!(
            self,
            Tool::WikiSearch | Tool::WikiSearchSummary | Tool::GenerateSquall
        )
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    /// Accepts the wire identifier, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Tool::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownTool(needle.to_string()))
    }
}

/// An intermediate step: one tool call and what it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStep {
    pub thought: String,
    pub action: Tool,
    /// The input as typed, before any question prefixing.
    pub action_input: String,
    /// `None` until the lookup succeeds.
    pub observation: Option<String>,
}

/// The terminal step carrying the annotator's answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalStep {
    pub thought: String,
    pub wikipedia_answer: String,
    pub wikidata_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireStep", try_from = "WireStep")]
pub enum Step {
    Action(ActionStep),
    Final(FinalStep),
}

impl Step {
    pub fn thought(&self) -> &str {
        match self {
            Step::Action(s) => &s.thought,
            Step::Final(s) => &s.thought,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Step::Final(_))
    }
}

impl From<ActionStep> for Step {
    fn from(step: ActionStep) -> Self {
        Step::Action(step)
    }
}

impl From<FinalStep> for Step {
    fn from(step: FinalStep) -> Self {
        Step::Final(step)
    }
}

/// Flat JSON shape with `isFinal` as the discriminant.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStep {
    thought: String,
    is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action: Option<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    observation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wikipedia_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wikidata_answer: Option<String>,
}

impl From<Step> for WireStep {
    fn from(step: Step) -> Self {
        match step {
            Step::Action(s) => WireStep {
                thought: s.thought,
                is_final: false,
                action: Some(s.action),
                action_input: Some(s.action_input),
                observation: s.observation,
                wikipedia_answer: None,
                wikidata_answer: None,
            },
            Step::Final(s) => WireStep {
                thought: s.thought,
                is_final: true,
                action: None,
                action_input: None,
                observation: None,
                wikipedia_answer: Some(s.wikipedia_answer),
                wikidata_answer: Some(s.wikidata_answer),
            },
        }
    }
}

impl TryFrom<WireStep> for Step {
    type Error = String;

    fn try_from(wire: WireStep) -> Result<Self, Self::Error> {
        if wire.is_final {
            Ok(Step::Final(FinalStep {
                thought: wire.thought,
                wikipedia_answer: wire
                    .wikipedia_answer
                    .ok_or("final step missing wikipediaAnswer")?,
                wikidata_answer: wire
                    .wikidata_answer
                    .ok_or("final step missing wikidataAnswer")?,
            }))
        } else {
            Ok(Step::Action(ActionStep {
                thought: wire.thought,
                action: wire.action.ok_or("action step missing action")?,
                action_input: wire.action_input.ok_or("action step missing actionInput")?,
                observation: wire.observation,
            }))
        }
    }
}
