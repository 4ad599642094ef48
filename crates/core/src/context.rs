//! Immutable per-call context for the command pipeline.
//!
//! Every flag the pipeline reads is carried here and passed into each
//! `handle()` call, so concurrent callers never share mutable settings.

use std::path::{Path, PathBuf};

use crate::config::Mode;

/// Read-only snapshot of the settings one pipeline invocation consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    mode: Mode,
    generation_enabled: bool,
    auto_execute: bool,
    os_context: String,
    working_dir: PathBuf,
}

impl PipelineContext {
    /// Context with generation on, auto-execution off, and the host OS
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            generation_enabled: true,
            auto_execute: false,
            os_context: std::env::consts::OS.to_string(),
            working_dir: PathBuf::from("."),
        }
    }

    pub fn with_generation(mut self, enabled: bool) -> Self {
        self.generation_enabled = enabled;
        self
    }

    pub fn with_auto_execute(mut self, allowed: bool) -> Self {
        self.auto_execute = allowed;
        self
    }

    pub fn with_os_context(mut self, os: impl Into<String>) -> Self {
        self.os_context = os.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether natural-language input may be turned into generated commands
    pub fn generation_enabled(&self) -> bool {
        self.generation_enabled
    }

    /// Whether auto-confirmation is permitted at all
    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    pub fn os_context(&self) -> &str {
        &self.os_context
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}
