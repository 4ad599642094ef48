//! Natural-language to shell-command pipeline.
//!
//! Input text flows one way: form detection, intent classification,
//! synthesis for operational requests, then risk review. Every execution
//! candidate is produced by the review stage.

pub mod candidate;
pub mod form;
pub mod intent;
mod lexicon;
pub mod orchestrator;
pub mod outcome;
pub mod synthesizer;

pub use candidate::{CandidateSource, Confirmation, ReviewedCandidate, confirmation_for};
pub use form::{Form, classify_form};
pub use intent::{Intent, classify_intent};
pub use orchestrator::Pipeline;
pub use outcome::{Clarification, ClarificationChoice, FinalAction, Outcome, RejectReason, Rejection};
pub use synthesizer::{CommandSynthesizer, Confidence, GeneratedCommand, SERVICE_UNAVAILABLE, apply_red_flags, parse_reply};
