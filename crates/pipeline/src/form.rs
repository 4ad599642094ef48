//! Language-form detection: natural-language request or explicit shell command.

use crate::lexicon::{normalize, strip_fillers, words};
use serde::{Deserialize, Serialize};

/// First words that mark typed shell commands, including the `try` prefix
const EXPLICIT_KEYWORDS: &[&str] = &[
    "try", "run", "exec", "execute", "sudo", "su", "docker", "podman", "git", "python", "python3", "pip", "pip3", "npm",
    "npx", "yarn", "pnpm", "node", "cargo", "rustc", "go", "kubectl", "helm", "terraform", "ansible", "make", "ls", "cd",
    "cat", "echo", "grep", "rm", "cp", "mv", "mkdir", "touch", "chmod", "chown", "curl", "wget", "ssh", "scp", "systemctl",
    "service", "journalctl", "apt", "apt-get", "yum", "dnf", "brew", "ps", "kill", "pkill", "killall", "tar", "dd", "mkfs",
    "df", "du", "top", "htop", "vim", "nano", "less", "tail", "head", "awk", "sed", "env", "export", "source",
];

/// Shell operators that practically never occur in prose
const SHELL_OPERATORS: &[&str] = &["|", ">", "<", "&&", ";", "$("];

/// Sentence-initial verbs and question words of natural-language requests
const NL_VOCABULARY: &[&str] = &[
    "show", "list", "find", "search", "display", "print", "get", "fetch", "count", "check", "verify", "convert",
    "generate", "create", "compare", "explain", "describe", "summarize", "tell", "give", "help", "what", "what's", "why",
    "how", "when", "which", "who", "where", "define", "locate", "stop", "start", "restart", "remove", "delete", "install",
    "monitor", "view", "analyze", "is", "are", "does", "do",
];

/// Whether input reads as prose or as a shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Form {
    Natural,
    Explicit,
}

impl Form {
    pub fn as_str(&self) -> &'static str {
        match self {
            Form::Natural => "NATURAL",
            Form::Explicit => "EXPLICIT",
        }
    }
}

impl std::fmt::Display for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify text as natural language or an explicit command.
///
/// Rules run in order and the first match wins:
/// 1. explicit keyword or `$ ` prompt as the first word
/// 2. shell operators anywhere, a flag token after the first word, or a path
///    as the first or second word
/// 3. natural-language vocabulary at the start, after filler phrases
/// 4. anything else stays explicit
///
/// Empty text is explicit.
pub fn classify_form(text: &str) -> Form {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Form::Explicit;
    }

    let first = normalized.split(' ').next().unwrap_or_default();
    if first == "$" || EXPLICIT_KEYWORDS.contains(&first) {
        return Form::Explicit;
    }

    if SHELL_OPERATORS.iter().any(|op| normalized.contains(op))
        || has_flag_token(&normalized)
        || has_path_token(&normalized)
    {
        return Form::Explicit;
    }

    let all = words(&normalized);
    let content = strip_fillers(&all);
    if content.len() >= 2 && NL_VOCABULARY.contains(&content[0].as_str()) {
        return Form::Natural;
    }

    Form::Explicit
}

fn has_flag_token(normalized: &str) -> bool {
    normalized
        .split(' ')
        .skip(1)
        .any(|token| token.len() > 1 && token.starts_with('-') && token[1..].starts_with(|c: char| c.is_alphanumeric() || c == '-'))
}

fn has_path_token(normalized: &str) -> bool {
    normalized.split(' ').take(2).any(is_path)
}

fn is_path(token: &str) -> bool {
    matches!(token, "." | ".." | "~")
        || token.starts_with("./")
        || token.starts_with("../")
        || token.starts_with('/')
        || token.starts_with("~/")
}
