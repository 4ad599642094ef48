//! Pipeline orchestrator: form detection, intent, synthesis, review.

use crate::candidate::review_candidate;
use crate::form::{Form, classify_form};
use crate::intent::{Intent, classify_intent};
use crate::outcome::{Clarification, ClarificationChoice, Outcome, Rejection};
use crate::synthesizer::CommandSynthesizer;
use clioraops_core::logging::{LoggingConfig, PrivacyConfig, redact_sensitive, sanitize_path};
use clioraops_core::{Config, ConfigError, Error, PipelineContext, Result};
use clioraops_providers::{ChatMessage, ChatRequest, Provider, ProviderFactory, explanation_system_prompt};
use std::sync::Arc;

/// Stateless between calls; each `handle` runs one input to a terminal [Outcome]
#[derive(Debug, Clone)]
pub struct Pipeline {
    synthesizer: CommandSynthesizer,
    privacy: PrivacyConfig,
}

impl Pipeline {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { synthesizer: CommandSynthesizer::new(provider), privacy: PrivacyConfig::default() }
    }

    /// Build a pipeline with the provider and privacy settings from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = config.provider.as_ref().map(ProviderFactory::create_from_config).transpose()?;
        let privacy = LoggingConfig::from(config.logging.clone()).privacy;
        Ok(Self::new(provider).with_privacy(privacy))
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.synthesizer = self.synthesizer.with_privacy(privacy);
        self.privacy = privacy;
        self
    }

    pub fn synthesizer(&self) -> &CommandSynthesizer {
        &self.synthesizer
    }

    /// Handle one raw input.
    ///
    /// Explicit input goes straight to review; natural language is routed by
    /// intent. Execution candidates are only produced by the review stage.
    pub async fn handle(&self, raw: &str, ctx: &PipelineContext) -> Outcome {
        let text = raw.trim();
        if text.is_empty() {
            tracing::debug!("empty input rejected");
            return Outcome::Reject(Rejection::empty_input());
        }

        let form = if ctx.generation_enabled() { classify_form(text) } else { Form::Explicit };
        tracing::debug!(
            input = %redact_sensitive(text, &self.privacy),
            form = %form,
            working_dir = %sanitize_path(ctx.working_dir()),
            "input classified"
        );

        if form == Form::Explicit {
            return Outcome::ExecuteCandidate(review_candidate(text.to_string(), None, ctx));
        }

        let (intent, confidence) = classify_intent(text);
        tracing::debug!(intent = %intent, confidence, "intent classified");

        match intent {
            Intent::Request => Outcome::Explain { text: text.to_string() },
            Intent::Ambiguous => Outcome::AskClarification(Clarification::new(text, confidence)),
            Intent::Command => self.synthesize_and_review(text, ctx).await,
        }
    }

    /// Continue an ASK_CLARIFICATION outcome with the user's pick
    pub async fn resolve_clarification(&self, choice: ClarificationChoice, text: &str, ctx: &PipelineContext) -> Outcome {
        let text = text.trim();
        if text.is_empty() {
            return Outcome::Reject(Rejection::empty_input());
        }

        tracing::debug!(choice = %choice, "clarification resolved");
        match choice {
            ClarificationChoice::Explain => Outcome::Explain { text: text.to_string() },
            ClarificationChoice::Command => self.synthesize_and_review(text, ctx).await,
        }
    }

    async fn synthesize_and_review(&self, text: &str, ctx: &PipelineContext) -> Outcome {
        let generated = self.synthesizer.synthesize(text, ctx).await;
        if !generated.success {
            return Outcome::Reject(Rejection::from_synthesis(&generated));
        }

        let command = generated.command.clone();
        Outcome::ExecuteCandidate(review_candidate(command, Some(generated), ctx))
    }

    /// Ask the explanation collaborator to answer an EXPLAIN outcome
    pub async fn explain(&self, text: &str, ctx: &PipelineContext) -> Result<String> {
        let provider = self
            .synthesizer
            .provider()
            .ok_or_else(|| Error::Config(ConfigError::ProviderNotConfigured.to_string()))?;

        let request = ChatRequest::builder()
            .add_message(ChatMessage::system(explanation_system_prompt(ctx.mode())))
            .add_message(ChatMessage::user(text))
            .build();

        let response = provider.generate(request).await?;
        Ok(response.content().trim().to_string())
    }
}
