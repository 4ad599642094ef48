//! Logging bootstrap built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `CLIORAOPS_LOG`: Filter directive (like `RUST_LOG`), e.g., `clioraops_pipeline=debug`
//! - `CLIORAOPS_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `CLIORAOPS_LOG_DIR`: Directory for file logs (default `~/.clioraops/logs/`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//!
//! [logging.privacy]
//! log_input = "truncate"
//! truncate_length = 200
//! ```
//!
//! # Example
//!
//! ```no_run
//! use clioraops_core::logging;
//!
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), clioraops_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig as ConfigLoggingConfig;
use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogFormat::parse_str(s).ok_or_else(|| Error::Config(format!("invalid log format: {}", s)))
    }
}

/// How user input and generated commands appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLogging {
    /// Replace with a placeholder.
    None,
    /// Keep up to `truncate_length` chars.
    #[default]
    Truncate,
    /// Log verbatim (may include secrets typed into commands).
    Full,
}

impl InputLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(InputLogging::None),
            "truncate" => Some(InputLogging::Truncate),
            "full" => Some(InputLogging::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputLogging::None => "none",
            InputLogging::Truncate => "truncate",
            InputLogging::Full => "full",
        }
    }
}

/// Runtime logging configuration resolved from the `[logging]` section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter for stderr output.
    pub level: String,
    pub format: LogFormat,
    /// Filter for the JSON file layer; `None` disables file logging.
    pub file_level: Option<String>,
    pub privacy: PrivacyConfig,
}

/// Privacy controls for logged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyConfig {
    pub log_input: InputLogging,
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_input: InputLogging::default(), truncate_length: 200 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file_level: None, privacy: PrivacyConfig::default() }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_input = InputLogging::parse_str(&config.privacy.log_input).unwrap_or_default();

        Self {
            level: config.level,
            format,
            file_level: if config.file.enabled { Some(config.file.level) } else { None },
            privacy: PrivacyConfig { log_input, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_logging(mut self, level: impl Into<String>) -> Self {
        self.file_level = Some(level.into());
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    /// Filter directive: `CLIORAOPS_LOG`, then `RUST_LOG`, then the configured level.
    fn filter_directive(&self) -> String {
        env::var("CLIORAOPS_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    fn build_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.filter_directive()).unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the stderr format; the environment wins over config, then TTY detection.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("CLIORAOPS_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format != LogFormat::Pretty {
            return self.format;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    fn log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("CLIORAOPS_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".clioraops").join("logs"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns the file writer's guard when file logging is enabled. Keep it alive
/// for the life of the process or buffered file events are lost.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let format = config.detect_format();
    let stderr_filter = config.build_env_filter();

    let (file_layer, guard) = match &config.file_level {
        Some(level) => {
            let log_dir = LoggingConfig::log_dir()?;
            std::fs::create_dir_all(&log_dir)
                .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

            let file_appender = tracing_appender::rolling::daily(log_dir, "clioraops.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("debug"));

            (Some(fmt::layer().json().with_writer(non_blocking).with_filter(filter)), Some(guard))
        }
        None => (None, None),
    };

    let registry = Registry::default().with(file_layer);

    let result = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).with_filter(stderr_filter))
            .try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr).with_filter(stderr_filter)).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(io::stderr).with_filter(stderr_filter)).try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;
    Ok(guard)
}

/// Redact logged user text according to privacy settings.
pub fn redact_sensitive(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_input {
        InputLogging::None => "[REDACTED]".to_string(),
        InputLogging::Full => content.to_string(),
        InputLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }

            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
    }
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &std::path::Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
