//! Terminal states of one pass through the pipeline.

use crate::candidate::ReviewedCandidate;
use crate::synthesizer::{GeneratedCommand, SERVICE_UNAVAILABLE};
use clioraops_providers::is_retryable_message;
use clioraops_review::ReviewResult;
use serde::Serialize;

const EXPLICIT_FALLBACK_HINT: &str = "Type the shell command directly to skip command generation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalAction {
    ExecuteCandidate,
    Explain,
    AskClarification,
    Reject,
}

impl FinalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalAction::ExecuteCandidate => "EXECUTE_CANDIDATE",
            FinalAction::Explain => "EXPLAIN",
            FinalAction::AskClarification => "ASK_CLARIFICATION",
            FinalAction::Reject => "REJECT",
        }
    }
}

impl std::fmt::Display for FinalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user's pick when asked to disambiguate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarificationChoice {
    /// Generate and review a shell command
    Command,
    /// Route to the explanation collaborator
    Explain,
}

impl ClarificationChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClarificationChoice::Command => "command",
            ClarificationChoice::Explain => "explain",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClarificationChoice::Command => "Generate and execute a shell command",
            ClarificationChoice::Explain => "Get information/explanation",
        }
    }
}

impl std::fmt::Display for ClarificationChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClarificationChoice {
    type Err = clioraops_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "command" | "cmd" | "1" => Ok(ClarificationChoice::Command),
            "explain" | "explanation" | "2" => Ok(ClarificationChoice::Explain),
            _ => Err(clioraops_core::Error::Validation(format!(
                "invalid choice '{s}', expected 'command' or 'explain'"
            ))),
        }
    }
}

/// Payload of an ASK_CLARIFICATION outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clarification {
    pub text: String,
    pub confidence: f32,
    pub interpretations: [ClarificationChoice; 2],
}

impl Clarification {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence, interpretations: [ClarificationChoice::Command, ClarificationChoice::Explain] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EmptyInput,
    /// No text-generation collaborator is configured
    GenerationUnavailable,
    SynthesisFailed,
}

/// Payload of a REJECT outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub reason: RejectReason,
    pub message: String,
    /// Whether trying the same input again may succeed
    pub retryable: bool,
    pub hint: Option<String>,
}

impl Rejection {
    pub fn empty_input() -> Self {
        Self {
            reason: RejectReason::EmptyInput,
            message: "Nothing to do: input is empty.".to_string(),
            retryable: false,
            hint: None,
        }
    }

    pub fn from_synthesis(generated: &GeneratedCommand) -> Self {
        let message = generated.error.clone().unwrap_or_else(|| "Generation failed".to_string());
        let reason = if message == SERVICE_UNAVAILABLE {
            RejectReason::GenerationUnavailable
        } else {
            RejectReason::SynthesisFailed
        };

        Self {
            reason,
            retryable: reason == RejectReason::SynthesisFailed && is_retryable_message(&message),
            message,
            hint: Some(EXPLICIT_FALLBACK_HINT.to_string()),
        }
    }
}

/// Result of handling one input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    ExecuteCandidate(ReviewedCandidate),
    Explain { text: String },
    AskClarification(Clarification),
    Reject(Rejection),
}

impl Outcome {
    pub fn action(&self) -> FinalAction {
        match self {
            Outcome::ExecuteCandidate(_) => FinalAction::ExecuteCandidate,
            Outcome::Explain { .. } => FinalAction::Explain,
            Outcome::AskClarification(_) => FinalAction::AskClarification,
            Outcome::Reject(_) => FinalAction::Reject,
        }
    }

    pub fn candidate(&self) -> Option<&ReviewedCandidate> {
        match self {
            Outcome::ExecuteCandidate(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Review attached to an execution candidate
    pub fn review(&self) -> Option<&ReviewResult> {
        self.candidate().map(ReviewedCandidate::review)
    }
}
