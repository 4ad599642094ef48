//! Line-by-line review of shell scripts.

use crate::reviewer::{ReviewResult, review};
use clioraops_core::{Mode, RiskLevel};
use serde::Serialize;

/// A risky line in a reviewed script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFinding {
    /// 1-based
    pub line_number: usize,
    pub line: String,
    pub review: ReviewResult,
}

impl LineFinding {
    pub fn summary(&self) -> String {
        format!("Line {}: {}", self.line_number, self.review.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptReview {
    pub risk_level: RiskLevel,
    pub lines_reviewed: usize,
    pub findings: Vec<LineFinding>,
}

impl ScriptReview {
    pub fn is_blocking(&self) -> bool {
        self.risk_level.is_blocking()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.findings.iter().map(LineFinding::summary).collect()
    }
}

fn is_reviewable(line: &str) -> bool {
    !(line.is_empty() || line.starts_with('#') || line.starts_with("//"))
}

/// Review each non-blank, non-comment line; the script's risk is the highest line risk
pub fn review_script(content: &str, mode: Mode) -> ScriptReview {
    let mut risk_level = RiskLevel::Safe;
    let mut lines_reviewed = 0;
    let mut findings = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if !is_reviewable(line) {
            continue;
        }
        lines_reviewed += 1;

        let result = review(line, mode);
        if result.risk_level() > RiskLevel::Safe {
            risk_level = risk_level.max(result.risk_level());
            findings.push(LineFinding { line_number: index + 1, line: line.to_string(), review: result });
        }
    }

    tracing::debug!(lines = lines_reviewed, findings = findings.len(), risk = %risk_level, "script reviewed");

    ScriptReview { risk_level, lines_reviewed, findings }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOY: &str = "#!/bin/bash
# deploy helper
set -euo pipefail

cd /srv/app
git pull
sudo systemctl restart app
rm -rf $BUILD_DIR
";

    #[test]
    fn test_review_script_takes_highest_risk() {
        let result = review_script(DEPLOY, Mode::Beginner);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.is_blocking());
        assert_eq!(result.lines_reviewed, 5);
        assert_eq!(result.findings.len(), 2);
        assert_eq!(result.findings[0].line_number, 7);
        assert_eq!(result.findings[1].line_number, 8);
    }

    #[test]
    fn test_summaries_prefix_line_numbers() {
        let result = review_script(DEPLOY, Mode::Beginner);
        let summaries = result.summaries();
        assert!(summaries[0].starts_with("Line 7: "));
        assert!(summaries[1].starts_with("Line 8: "));
    }

    #[test]
    fn test_comments_and_blanks_are_skipped() {
        let script = "# rm -rf /\n// sudo su\n\n   \nls -la\n";
        let result = review_script(script, Mode::Architect);
        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert_eq!(result.lines_reviewed, 1);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_empty_script_is_safe() {
        let result = review_script("", Mode::Beginner);
        assert_eq!(result.risk_level, RiskLevel::Safe);
        assert_eq!(result.lines_reviewed, 0);
        assert!(!result.is_blocking());
    }
}
