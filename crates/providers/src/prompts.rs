//! Prompt templates for the text-generation collaborators.
//!
//! The synthesis prompts pin the reply to a fixed JSON shape that the
//! command synthesizer parses; the explanation prompts only set the register.

use clioraops_core::Mode;
use std::path::Path;

/// JSON shape every synthesis reply must follow
pub const SYNTHESIS_REPLY_SHAPE: &str = r#"{
  "success": true,
  "command": "the shell command",
  "explanation": "brief explanation of what this does",
  "confidence": "high|medium|low",
  "warnings": ["any safety concerns if applicable"]
}"#;

/// System prompt for turning a request into one shell command
pub fn synthesis_system_prompt(os_context: &str, working_dir: &Path, mode: Mode) -> String {
    let explanation_style = match mode {
        Mode::Beginner => "Write the explanation for a newcomer: say what each flag does in plain words.",
        Mode::Architect => "Keep the explanation to one terse technical sentence.",
    };

    format!(
        "You are an expert shell command generator for {os} systems.\n\n\
         Your task is to translate natural language into shell commands.\n\n\
         GUIDELINES:\n\
         1. Prefer safe, read-only commands when ambiguous\n\
         2. Use common, portable tools (prefer 'find' over 'locate')\n\
         3. Include necessary flags for clarity and safety\n\
         4. For file operations, prefer checking before modifying\n\
         5. Never suggest destructive commands (rm -rf, dd, mkfs) unless explicitly requested\n\
         6. Return JSON format ONLY, no other text\n\
         7. {style}\n\n\
         RESPONSE FORMAT (MUST BE VALID JSON):\n{shape}\n\n\
         If the request cannot be expressed as a single safe command, reply with \
         {{\"success\": false, \"error\": \"reason\"}}.\n\n\
         Current context:\n\
         - OS: {os}\n\
         - Working directory: {dir}\n\n\
         Only respond with valid JSON.",
        os = os_context,
        style = explanation_style,
        shape = SYNTHESIS_REPLY_SHAPE,
        dir = working_dir.display(),
    )
}

/// User prompt carrying the natural-language request
pub fn synthesis_user_prompt(request: &str, os_context: &str) -> String {
    format!(
        "Translate this request into a shell command for {os}:\n\n\"{request}\"\n\n\
         Requirements:\n\
         1. The command must be executable on {os}\n\
         2. Prefer read-only operations unless explicitly modifying is requested\n\
         3. Use standard utilities, not exotic or obscure tools\n\
         4. Include appropriate flags for safety and clarity\n\
         5. Return valid JSON only",
        os = os_context,
        request = request.trim(),
    )
}

/// System prompt for answering informational requests
pub fn explanation_system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::Beginner => {
            "You are ClioraOps, a patient DevOps mentor. Explain concepts in plain language, \
             use a short analogy where it helps, and end with one practical next step. \
             Do not suggest commands that change the system."
        }
        Mode::Architect => {
            "You are ClioraOps, a senior infrastructure architect. Answer precisely and concisely, \
             cover trade-offs and failure modes, and skip introductory material."
        }
    }
}
