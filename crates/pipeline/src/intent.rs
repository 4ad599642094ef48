//! Intent classification for natural-language input.
//!
//! Five tiers are tried in order; the first that matches decides both the
//! intent and its fixed confidence.

use crate::lexicon::{contains_word, normalize, strip_fillers, words};
use serde::{Deserialize, Serialize};

pub const QUESTION_CONFIDENCE: f32 = 0.95;
pub const CONCEPT_CONFIDENCE: f32 = 0.88;
pub const ACTION_CONFIDENCE: f32 = 0.90;
pub const COMPARISON_CONFIDENCE: f32 = 0.88;
pub const FALLBACK_CONFIDENCE: f32 = 0.50;

const QUESTION_WORDS: &[&str] = &["what", "why", "how", "when", "which", "who", "where", "what's", "how's", "where's", "who's"];

const CONCEPT_VERBS: &[&str] = &["explain", "describe", "define", "understand", "tell", "compare", "teach", "clarify"];

const ACTION_VERBS: &[&str] = &[
    "show", "find", "list", "count", "check", "get", "search", "display", "locate", "fetch", "retrieve", "print", "view",
    "monitor", "stop", "start", "restart", "remove", "delete", "install", "create", "convert", "compress", "extract",
];

const SYSTEM_TARGETS: &[&str] = &[
    "container", "file", "process", "service", "port", "user", "group", "directory", "folder", "image", "log", "package",
    "network", "volume", "database", "config", "configuration", "resource", "pod", "deployment", "namespace", "disk",
    "branch", "commit", "memory", "cpu", "connection", "variable", "job", "node", "interface", "permission", "video",
    "archive", "space", "usage",
];

const COMPARISON_WORDS: &[&str] = &["difference", "differences", "versus", "vs", "compared", "similar", "better"];

/// What the user wants done with their natural-language input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    /// Produce and run a shell command
    Command,
    /// Answer or explain something
    Request,
    /// Cannot tell; ask the user
    Ambiguous,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Command => "COMMAND",
            Intent::Request => "REQUEST",
            Intent::Ambiguous => "AMBIGUOUS",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify natural-language text into an intent with a fixed confidence
pub fn classify_intent(text: &str) -> (Intent, f32) {
    let normalized = normalize(text);
    let all = words(&normalized);
    let content = strip_fillers(&all);

    let has = |set: &[&str]| content.iter().any(|w| contains_word(set, w));
    let has_action_target = content.iter().any(|w| ACTION_VERBS.contains(&w.as_str())) && has(SYSTEM_TARGETS);

    if is_question(content, &normalized) {
        return (Intent::Request, QUESTION_CONFIDENCE);
    }
    if content.iter().any(|w| CONCEPT_VERBS.contains(&w.as_str())) && !has_action_target {
        return (Intent::Request, CONCEPT_CONFIDENCE);
    }
    if has_action_target {
        return (Intent::Command, ACTION_CONFIDENCE);
    }
    if has(COMPARISON_WORDS) {
        return (Intent::Request, COMPARISON_CONFIDENCE);
    }

    (Intent::Ambiguous, FALLBACK_CONFIDENCE)
}

/// Leading question word, or a question mark with a question word anywhere
fn is_question(content: &[String], normalized: &str) -> bool {
    let Some(first) = content.first() else {
        return false;
    };
    if QUESTION_WORDS.contains(&first.as_str()) {
        return true;
    }
    normalized.ends_with('?') && content.iter().any(|w| QUESTION_WORDS.contains(&w.as_str()))
}
