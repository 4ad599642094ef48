//! Command synthesis through the text-generation collaborator.

use clioraops_core::PipelineContext;
use clioraops_core::logging::{PrivacyConfig, redact_sensitive};
use clioraops_providers::{ChatMessage, ChatRequest, Provider, synthesis_system_prompt, synthesis_user_prompt};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

pub const SERVICE_UNAVAILABLE: &str = "AI service not available. Cannot generate commands.";

const SYNTHESIS_TEMPERATURE: f32 = 0.2;
const SYNTHESIS_MAX_TOKENS: u32 = 512;

/// How sure the collaborator is about a generated command
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Unknown or missing values fall back to medium
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("high") => Confidence::High,
            Some("low") => Confidence::Low,
            _ => Confidence::Medium,
        }
    }

    /// One step down; low stays low
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Candidate produced from one collaborator reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedCommand {
    pub success: bool,
    pub command: String,
    pub explanation: String,
    pub confidence: Confidence,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl GeneratedCommand {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            command: String::new(),
            explanation: String::new(),
            confidence: Confidence::Low,
            warnings: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Reply shape requested from the collaborator; every field is optional on the wire
#[derive(Debug, Deserialize)]
struct SynthesisReply {
    success: bool,
    command: Option<String>,
    explanation: Option<String>,
    confidence: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
    error: Option<String>,
}

struct RedFlag {
    regex: Regex,
    warning: &'static str,
}

const RED_FLAGS: &[(&str, &str)] = &[
    (r"\brm\s+-[a-z]*[rf][a-z]*\s+(?:-[a-z]+\s+)*/(?:\s|\*|$)", "Potentially dangerous pattern detected: deletes from the filesystem root"),
    (r"\bdd\s+if=", "Potentially dangerous pattern detected: raw disk copy (dd)"),
    (r"\bmkfs\.", "Potentially dangerous pattern detected: formats a filesystem"),
    (r":\(\)\s*\{", "Potentially dangerous pattern detected: fork bomb"),
    (r"\bchmod\s+(?:-[a-z]+\s+)*0?(?:000|777)\b", "Potentially dangerous pattern detected: sweeping permission change"),
    (r"\bsudo\s+(?:rm|dd|mkfs)\b", "Potentially dangerous pattern detected: destructive command run as root"),
    (r">\s*/dev/sd[a-z]", "Potentially dangerous pattern detected: writes to a block device"),
    (r"\bsystemctl\s+(?:stop|disable|mask)\b", "Potentially dangerous pattern detected: stops or disables a service"),
    (r"(?:^|\s)(?:-i|--interactive)(?:\s|$)", "Command may prompt for confirmation (interactive flag)"),
    (r"\b(?:curl|wget|nc|ssh)\b", "Network operation detected - verify the URL/host"),
    (r"\bsudo\b", "Command requires elevated privileges (sudo)"),
];

static RED_FLAG_RULES: LazyLock<Vec<RedFlag>> = LazyLock::new(|| {
    RED_FLAGS
        .iter()
        .map(|&(pattern, warning)| RedFlag {
            regex: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .unwrap_or_else(|e| panic!("red flag pattern '{pattern}' does not compile: {e}")),
            warning,
        })
        .collect()
});

/// Append a warning and downgrade confidence once per red flag found in the command
pub fn apply_red_flags(generated: &mut GeneratedCommand) {
    for flag in RED_FLAG_RULES.iter() {
        if flag.regex.is_match(&generated.command) {
            generated.warnings.push(flag.warning.to_string());
            generated.confidence = generated.confidence.downgrade();
        }
    }
}

/// Parse a raw collaborator reply into a candidate.
///
/// The JSON object is taken from the first `{` to the last `}` so replies
/// wrapped in prose or code fences still parse.
pub fn parse_reply(content: &str) -> GeneratedCommand {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return GeneratedCommand::failed("Invalid response format from AI");
    };
    if end < start {
        return GeneratedCommand::failed("Invalid response format from AI");
    }

    let reply: SynthesisReply = match serde_json::from_str(&content[start..=end]) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::debug!(error = %e, "synthesis reply did not match the expected structure");
            return GeneratedCommand::failed("Invalid response structure");
        }
    };

    if !reply.success {
        return GeneratedCommand::failed(reply.error.unwrap_or_else(|| "Generation failed".to_string()));
    }

    let command = reply.command.map(|c| c.trim().to_string()).unwrap_or_default();
    if command.is_empty() {
        return GeneratedCommand::failed("No command generated");
    }

    let mut generated = GeneratedCommand {
        success: true,
        command,
        explanation: reply.explanation.unwrap_or_default(),
        confidence: Confidence::parse_lenient(reply.confidence.as_deref()),
        warnings: reply.warnings,
        error: None,
    };
    apply_red_flags(&mut generated);
    generated
}

/// Turns operational requests into candidate commands.
///
/// Makes exactly one collaborator call per request and never retries.
#[derive(Clone)]
pub struct CommandSynthesizer {
    provider: Option<Arc<dyn Provider>>,
    privacy: PrivacyConfig,
}

impl CommandSynthesizer {
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider, privacy: PrivacyConfig::default() }
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        self.provider.as_ref()
    }

    pub fn build_request(text: &str, ctx: &PipelineContext) -> ChatRequest {
        ChatRequest::builder()
            .add_message(ChatMessage::system(synthesis_system_prompt(ctx.os_context(), ctx.working_dir(), ctx.mode())))
            .add_message(ChatMessage::user(synthesis_user_prompt(text, ctx.os_context())))
            .temperature(SYNTHESIS_TEMPERATURE)
            .max_tokens(SYNTHESIS_MAX_TOKENS)
            .build()
    }

    /// Generate a candidate command; failures come back as `success: false`
    pub async fn synthesize(&self, text: &str, ctx: &PipelineContext) -> GeneratedCommand {
        let Some(provider) = &self.provider else {
            tracing::warn!("synthesis requested without a configured provider");
            return GeneratedCommand::failed(SERVICE_UNAVAILABLE);
        };

        let request = Self::build_request(text, ctx);
        let generated = match provider.generate(request).await {
            Ok(response) => parse_reply(response.content()),
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "synthesis call failed");
                return GeneratedCommand::failed(format!("Generation failed: {e}"));
            }
        };

        if generated.success {
            tracing::debug!(
                command = %redact_sensitive(&generated.command, &self.privacy),
                confidence = %generated.confidence,
                warnings = generated.warnings.len(),
                "command synthesized"
            );
        } else {
            tracing::warn!(error = generated.error.as_deref().unwrap_or_default(), "synthesis reply rejected");
        }
        generated
    }
}

impl std::fmt::Debug for CommandSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSynthesizer")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}
