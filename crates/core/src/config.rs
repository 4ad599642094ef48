use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::PipelineContext;
use crate::error::Result;

/// Interaction mode supplied by the surrounding application.
///
/// Selects which explanation field a review reports and which confirmation
/// policy the orchestrator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Plain-language explanations; every candidate is confirmed (default)
    #[default]
    Beginner,
    /// Terse, technical explanations; auto-confirmation may apply
    Architect,
}

impl Mode {
    pub const VALUES: &[Mode] = &[Mode::Beginner, Mode::Architect];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Beginner => "beginner",
            Mode::Architect => "architect",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Mode::Beginner),
            "architect" => Ok(Mode::Architect),
            _ => Err(crate::Error::Config(ConfigError::InvalidMode(s.to_string()).to_string())),
        }
    }
}

/// Text-generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Google Gemini
    #[serde(rename = "gemini")]
    Gemini {
        /// API key; falls back to `GEMINI_API_KEY` when empty
        #[serde(default)]
        api_key: String,
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
    },
    /// Local Ollama daemon
    #[serde(rename = "ollama")]
    Ollama {
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default = "default_ollama_base_url")]
        base_url: String,
    },
    /// Any OpenAI-compatible chat completions endpoint
    #[serde(rename = "openai")]
    OpenAi {
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default = "default_openai_base_url")]
        base_url: String,
    },
    /// Scripted replies for tests and offline runs
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        responses_file: Option<String>,
    },
}

impl ProviderConfig {
    /// Short backend name for status output
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => "gemini",
            ProviderConfig::Ollama { .. } => "ollama",
            ProviderConfig::OpenAi { .. } => "openai",
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    /// Model name, when the backend has one
    pub fn model(&self) -> Option<&str> {
        match self {
            ProviderConfig::Gemini { model, .. }
            | ProviderConfig::Ollama { model, .. }
            | ProviderConfig::OpenAi { model, .. } => Some(model),
            ProviderConfig::Mock { .. } => None,
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Natural-language handling flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NlConfig {
    /// Detect natural language and generate commands from it
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allow auto-confirmation of high-confidence generated commands
    #[serde(default)]
    pub auto_execute: bool,
}

impl Default for NlConfig {
    fn default() -> Self {
        Self { enabled: true, auto_execute: false }
    }
}

fn default_true() -> bool {
    true
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingConfig,

    #[serde(default)]
    pub privacy: PrivacySection,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacySection::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// `[logging.file]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_log_level")]
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_log_level() }
    }
}

fn default_file_log_level() -> String {
    "debug".to_string()
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacySection {
    /// How user input and generated commands appear in logs: `none`, `truncate` or `full`
    #[serde(default = "default_log_input")]
    pub log_input: String,

    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

impl Default for PrivacySection {
    fn default() -> Self {
        Self { log_input: default_log_input(), truncate_length: default_truncate_length() }
    }
}

fn default_log_input() -> String {
    "truncate".to_string()
}

fn default_truncate_length() -> usize {
    200
}

/// Root configuration structure for clioraops.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interaction mode
    #[serde(default)]
    pub mode: Mode,

    /// Operating system named in generation prompts (defaults to the host OS)
    #[serde(default)]
    pub os_context: Option<String>,

    #[serde(default)]
    pub nl: NlConfig,

    /// Text-generation backend; generation is unavailable without one
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Operating system used for generation prompts
    pub fn os_context(&self) -> String {
        self.os_context.clone().unwrap_or_else(|| std::env::consts::OS.to_string())
    }

    /// Get the configured provider or fail
    pub fn provider(&self) -> Result<&ProviderConfig> {
        self.provider
            .as_ref()
            .ok_or_else(|| crate::Error::Config(ConfigError::ProviderNotConfigured.to_string()))
    }

    /// Build the immutable per-call context the pipeline consumes
    pub fn pipeline_context(&self, working_dir: impl Into<PathBuf>) -> PipelineContext {
        PipelineContext::new(self.mode)
            .with_generation(self.nl.enabled)
            .with_auto_execute(self.nl.auto_execute)
            .with_os_context(self.os_context())
            .with_working_dir(working_dir)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if let Some(os) = &self.os_context
            && os.trim().is_empty()
        {
            return Err(Error::Config(ConfigError::EmptyField("os_context".to_string()).to_string()));
        }

        match &self.provider {
            Some(ProviderConfig::OpenAi { api_key, .. }) if api_key.trim().is_empty() => Err(Error::Config(
                ConfigError::EmptyField("provider.api_key".to_string()).to_string(),
            )),
            Some(ProviderConfig::Gemini { model, .. })
            | Some(ProviderConfig::Ollama { model, .. })
            | Some(ProviderConfig::OpenAi { model, .. })
                if model.trim().is_empty() =>
            {
                Err(Error::Config(ConfigError::EmptyField("provider.model".to_string()).to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# ClioraOps Configuration Example

# Interaction mode: "beginner" or "architect"
mode = "beginner"

# Operating system named in generation prompts (optional, defaults to the host OS)
# os_context = "linux"

[nl]
# Detect natural language and turn operational requests into commands
enabled = true
# Auto-confirm generated commands (architect mode, high confidence, no warnings only)
auto_execute = false

# Text-generation backend (optional; without it only explicit commands are reviewed)
# Uncomment to enable natural-language requests.
# [provider]
# Provider type: "gemini", "ollama", "openai" or "mock"
# provider = "gemini"
# API key (gemini falls back to GEMINI_API_KEY when empty)
# api_key = ""
# model = "gemini-2.0-flash"
# base_url = "https://custom.api.url"

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false

[logging.privacy]
# "none", "truncate" or "full"
log_input = "truncate"
truncate_length = 200
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid mode
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Invalid risk level
    #[error("invalid risk level: {0}")]
    InvalidRiskLevel(String),

    /// No `[provider]` section
    #[error("no text-generation provider configured")]
    ProviderNotConfigured,

    /// Required field present but empty
    #[error("field must not be empty: {0}")]
    EmptyField(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mode_values() {
        assert_eq!(Mode::Beginner.as_str(), "beginner");
        assert_eq!(Mode::Architect.as_str(), "architect");
        assert_eq!(Mode::VALUES.len(), 2);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(Mode::from_str("beginner").unwrap(), Mode::Beginner);
        assert_eq!(Mode::from_str("ARCHITECT").unwrap(), Mode::Architect);
        assert!(Mode::from_str("expert").is_err());
    }

    #[test]
    fn test_mode_default() {
        assert_eq!(Mode::default(), Mode::Beginner);
    }

    #[test]
    fn test_config_from_toml_str() {
        let toml = r#"
mode = "architect"
os_context = "macos"

[nl]
enabled = true
auto_execute = true

[provider]
provider = "gemini"
api_key = "test-api-key"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.mode, Mode::Architect);
        assert_eq!(config.os_context(), "macos");
        assert!(config.nl.enabled);
        assert!(config.nl.auto_execute);

        match config.provider().unwrap() {
            ProviderConfig::Gemini { api_key, model, base_url } => {
                assert_eq!(api_key, "test-api-key");
                assert_eq!(model, "gemini-2.0-flash");
                assert_eq!(base_url, &default_gemini_base_url());
            }
            _ => panic!("Expected Gemini provider"),
        }
    }

    #[test]
    fn test_config_empty_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.mode, Mode::Beginner);
        assert!(config.nl.enabled);
        assert!(!config.nl.auto_execute);
        assert!(config.provider.is_none());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.os_context(), std::env::consts::OS);
    }

    #[test]
    fn test_config_provider_missing() {
        let config = Config::default();
        let err = config.provider().unwrap_err();
        assert!(err.to_string().contains("no text-generation provider configured"));
    }

    #[test]
    fn test_config_provider_ollama() {
        let toml = r#"
[provider]
provider = "ollama"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        match config.provider().unwrap() {
            ProviderConfig::Ollama { model, base_url } => {
                assert_eq!(model, "llama3");
                assert_eq!(base_url, "http://localhost:11434");
            }
            _ => panic!("Expected Ollama provider"),
        }
    }

    #[test]
    fn test_config_provider_openai_custom_url() {
        let toml = r#"
[provider]
provider = "openai"
api_key = "sk-test"
model = "gpt-4o-mini"
base_url = "https://proxy.internal/v1"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        let provider = config.provider().unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_config_provider_mock() {
        let toml = r#"
[provider]
provider = "mock"
responses_file = "replies.toml"
"#;

        let config = Config::from_toml_str(toml).unwrap();
        match config.provider().unwrap() {
            ProviderConfig::Mock { responses_file } => {
                assert_eq!(responses_file.as_deref(), Some("replies.toml"));
            }
            _ => panic!("Expected Mock provider"),
        }
    }

    #[test]
    fn test_config_validation_openai_requires_key() {
        let toml = r#"
[provider]
provider = "openai"
api_key = "  "
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("provider.api_key"));
    }

    #[test]
    fn test_config_validation_empty_os_context() {
        let result = Config::from_toml_str("os_context = \"\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result = Config::from_toml_str("colour = \"blue\"");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_config_invalid_mode() {
        let result = Config::from_toml_str("mode = \"wizard\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config.mode, Mode::Beginner);
        assert!(config.provider.is_none());
        assert!(!config.logging.file.enabled);
        assert_eq!(config.logging.privacy.truncate_length, 200);
    }

    #[test]
    fn test_config_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("clioraops.toml");
        std::fs::write(&path, "mode = \"architect\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.mode, Mode::Architect);

        let missing = Config::from_file(&temp.path().join("missing.toml"));
        assert!(matches!(missing, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_pipeline_context_from_config() {
        let toml = r#"
mode = "architect"
os_context = "linux"

[nl]
enabled = false
auto_execute = true
"#;

        let config = Config::from_toml_str(toml).unwrap();
        let ctx = config.pipeline_context("/srv/app");
        assert_eq!(ctx.mode(), Mode::Architect);
        assert!(!ctx.generation_enabled());
        assert!(ctx.auto_execute());
        assert_eq!(ctx.os_context(), "linux");
        assert_eq!(ctx.working_dir(), Path::new("/srv/app"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidMode("wizard".to_string());
        assert_eq!(err.to_string(), "invalid mode: wizard");

        let err = ConfigError::InvalidRiskLevel("severe".to_string());
        assert_eq!(err.to_string(), "invalid risk level: severe");

        let err = ConfigError::EmptyField("provider.model".to_string());
        assert_eq!(err.to_string(), "field must not be empty: provider.model");

        let err = ConfigError::TomlParse("parse error".to_string());
        assert_eq!(err.to_string(), "TOML parse error: parse error");
    }
}
