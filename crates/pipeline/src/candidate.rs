//! The review stage: the only place a [ReviewedCandidate] is built.
//!
//! Fields are private to this module, so every execution candidate the
//! pipeline hands out carries the [ReviewResult] computed for its exact
//! command text.

use crate::synthesizer::{Confidence, GeneratedCommand};
use clioraops_core::{Mode, PipelineContext, RiskLevel};
use clioraops_review::{ReviewResult, review};
use serde::Serialize;

/// Where a candidate command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Typed by the user
    Explicit,
    /// Produced by the command synthesizer
    Synthesized,
}

/// What the front end must do before running a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Required,
    AutoConfirmable,
}

impl Confirmation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confirmation::Required => "confirmation required",
            Confirmation::AutoConfirmable => "auto-confirmable",
        }
    }
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewedCandidate {
    command: String,
    source: CandidateSource,
    review: ReviewResult,
    confirmation: Confirmation,
    generated: Option<GeneratedCommand>,
}

impl ReviewedCandidate {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn source(&self) -> CandidateSource {
        self.source
    }

    pub fn review(&self) -> &ReviewResult {
        &self.review
    }

    pub fn confirmation(&self) -> Confirmation {
        self.confirmation
    }

    pub fn requires_confirmation(&self) -> bool {
        self.confirmation == Confirmation::Required
    }

    /// Synthesis record for generated candidates
    pub fn generated(&self) -> Option<&GeneratedCommand> {
        self.generated.as_ref()
    }
}

/// Review a candidate and decide its confirmation policy
pub(crate) fn review_candidate(command: String, generated: Option<GeneratedCommand>, ctx: &PipelineContext) -> ReviewedCandidate {
    let review = review(&command, ctx.mode());
    let confirmation = confirmation_for(&review, generated.as_ref(), ctx);
    let source = if generated.is_some() { CandidateSource::Synthesized } else { CandidateSource::Explicit };

    tracing::debug!(
        risk = %review.risk_level(),
        source = ?source,
        confirmation = %confirmation,
        "candidate reviewed"
    );

    ReviewedCandidate { command, source, review, confirmation, generated }
}

/// Confirmation policy.
///
/// Typed commands, blocking risks, and CAUTION in beginner mode always need
/// confirmation. Auto-confirmation needs architect mode, auto-execute
/// allowed, high confidence, and no warnings.
pub fn confirmation_for(review: &ReviewResult, generated: Option<&GeneratedCommand>, ctx: &PipelineContext) -> Confirmation {
    let Some(generated) = generated else {
        return Confirmation::Required;
    };
    if review.is_blocking() {
        return Confirmation::Required;
    }
    if review.risk_level() == RiskLevel::Caution && ctx.mode() == Mode::Beginner {
        return Confirmation::Required;
    }

    let trusted = ctx.mode() == Mode::Architect
        && ctx.auto_execute()
        && generated.confidence == Confidence::High
        && generated.warnings.is_empty();

    if trusted { Confirmation::AutoConfirmable } else { Confirmation::Required }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(command: &str, confidence: Confidence, warnings: Vec<&str>) -> GeneratedCommand {
        GeneratedCommand {
            success: true,
            command: command.to_string(),
            explanation: String::new(),
            confidence,
            warnings: warnings.into_iter().map(String::from).collect(),
            error: None,
        }
    }

    fn trusted_ctx() -> PipelineContext {
        PipelineContext::new(Mode::Architect).with_auto_execute(true)
    }

    #[test]
    fn test_explicit_candidates_always_require_confirmation() {
        let candidate = review_candidate("ls -la".to_string(), None, &trusted_ctx());
        assert_eq!(candidate.source(), CandidateSource::Explicit);
        assert_eq!(candidate.confirmation(), Confirmation::Required);
        assert!(candidate.generated().is_none());
    }

    #[test]
    fn test_trusted_path_is_auto_confirmable() {
        let g = generated("docker ps -a", Confidence::High, vec![]);
        let candidate = review_candidate(g.command.clone(), Some(g), &trusted_ctx());
        assert_eq!(candidate.source(), CandidateSource::Synthesized);
        assert_eq!(candidate.confirmation(), Confirmation::AutoConfirmable);
        assert!(!candidate.requires_confirmation());
    }

    #[test]
    fn test_each_auto_condition_is_required() {
        let ctx_variants = [
            PipelineContext::new(Mode::Beginner).with_auto_execute(true),
            PipelineContext::new(Mode::Architect).with_auto_execute(false),
        ];
        for ctx in &ctx_variants {
            let g = generated("docker ps -a", Confidence::High, vec![]);
            assert_eq!(review_candidate(g.command.clone(), Some(g), ctx).confirmation(), Confirmation::Required);
        }

        let g = generated("docker ps -a", Confidence::Medium, vec![]);
        assert_eq!(review_candidate(g.command.clone(), Some(g), &trusted_ctx()).confirmation(), Confirmation::Required);

        let g = generated("docker ps -a", Confidence::High, vec!["check the output"]);
        assert_eq!(review_candidate(g.command.clone(), Some(g), &trusted_ctx()).confirmation(), Confirmation::Required);
    }

    #[test]
    fn test_blocking_risk_always_requires_confirmation() {
        let g = generated("rm -rf /", Confidence::High, vec![]);
        let candidate = review_candidate(g.command.clone(), Some(g), &trusted_ctx());
        assert!(candidate.review().is_blocking());
        assert_eq!(candidate.confirmation(), Confirmation::Required);
    }

    #[test]
    fn test_caution_depends_on_mode() {
        let g = generated("git push --force origin main", Confidence::High, vec![]);
        let beginner = PipelineContext::new(Mode::Beginner).with_auto_execute(true);
        let candidate = review_candidate(g.command.clone(), Some(g.clone()), &beginner);
        assert_eq!(candidate.review().risk_level(), RiskLevel::Caution);
        assert_eq!(candidate.confirmation(), Confirmation::Required);

        let candidate = review_candidate(g.command.clone(), Some(g), &trusted_ctx());
        assert_eq!(candidate.confirmation(), Confirmation::AutoConfirmable);
    }

    #[test]
    fn test_candidate_review_matches_command() {
        let candidate = review_candidate("sudo su".to_string(), None, &PipelineContext::default());
        assert_eq!(candidate.review(), &review("sudo su", Mode::Beginner));
        assert_eq!(candidate.command(), "sudo su");
    }
}
