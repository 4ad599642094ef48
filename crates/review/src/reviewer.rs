//! Risk classification of a single command against the pattern catalog.

use crate::catalog::{CommandPattern, catalog};
use clioraops_core::{Mode, RiskLevel};
use serde::Serialize;

const NO_MATCH_BEGINNER: &str = "No known risky patterns were found. That only means this command is not in the catalog of known dangerous commands; read it before you run it.";
const NO_MATCH_ARCHITECT: &str = "No catalog match. SAFE relative to the known-pattern catalog only; not a guarantee.";
const NO_MATCH_MESSAGE: &str = "No known dangerous patterns detected.";

/// Outcome of reviewing one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewResult {
    risk_level: RiskLevel,
    #[serde(serialize_with = "serialize_pattern_ids")]
    matched_patterns: Vec<&'static CommandPattern>,
    message: String,
    explanation: String,
    safe_alternative: Option<String>,
    learning_note: Option<String>,
}

fn serialize_pattern_ids<S>(patterns: &[&'static CommandPattern], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(patterns.iter().map(|p| p.id))
}

impl ReviewResult {
    fn unmatched(mode: Mode) -> Self {
        let explanation = match mode {
            Mode::Beginner => NO_MATCH_BEGINNER,
            Mode::Architect => NO_MATCH_ARCHITECT,
        };
        Self {
            risk_level: RiskLevel::Safe,
            matched_patterns: Vec::new(),
            message: NO_MATCH_MESSAGE.to_string(),
            explanation: explanation.to_string(),
            safe_alternative: None,
            learning_note: None,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Every entry that matched, in catalog order
    pub fn matched_patterns(&self) -> &[&'static CommandPattern] {
        &self.matched_patterns
    }

    pub fn matched_ids(&self) -> Vec<&'static str> {
        self.matched_patterns.iter().map(|p| p.id).collect()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn safe_alternative(&self) -> Option<&str> {
        self.safe_alternative.as_deref()
    }

    pub fn learning_note(&self) -> Option<&str> {
        self.learning_note.as_deref()
    }

    /// DANGEROUS and CRITICAL reviews block execution
    pub fn is_blocking(&self) -> bool {
        self.risk_level.is_blocking()
    }
}

/// Review a command string against the catalog.
///
/// Total over all inputs: empty text or text with no match yields SAFE with
/// no matched patterns. The explanation, alternative, and learning note come
/// from the most severe match, earliest in catalog order on ties.
pub fn review(command: &str, mode: Mode) -> ReviewResult {
    if command.trim().is_empty() {
        return ReviewResult::unmatched(mode);
    }

    let matched: Vec<&'static CommandPattern> = catalog().iter().filter(|p| p.matches(command)).collect();

    let Some(top) = most_severe(&matched) else {
        tracing::trace!("no catalog match");
        return ReviewResult::unmatched(mode);
    };

    let explanation = match mode {
        Mode::Beginner => top.beginner_explanation,
        Mode::Architect => top.architect_explanation,
    };
    let risky = top.risk_level > RiskLevel::Safe;

    tracing::debug!(
        risk = %top.risk_level,
        top = top.id,
        matches = matched.len(),
        "command reviewed"
    );

    ReviewResult {
        risk_level: top.risk_level,
        message: top.description.to_string(),
        explanation: explanation.to_string(),
        safe_alternative: risky.then(|| top.safe_alternative.to_string()),
        learning_note: risky.then(|| top.learning_note.to_string()),
        matched_patterns: matched,
    }
}

/// First entry with the highest risk level
fn most_severe(matched: &[&'static CommandPattern]) -> Option<&'static CommandPattern> {
    let max = matched.iter().map(|p| p.risk_level).max()?;
    matched.iter().copied().find(|p| p.risk_level == max)
}

/// Render a review for terminal output
pub fn format_review(result: &ReviewResult) -> String {
    let mut out = format!(
        "{} {}: {}\n{}",
        result.risk_level().symbol(),
        result.risk_level(),
        result.message(),
        result.explanation()
    );

    if let Some(alternative) = result.safe_alternative() {
        out.push_str(&format!("\nSafer alternative: {alternative}"));
    }
    if let Some(note) = result.learning_note() {
        out.push_str(&format!("\nLearning note: {note}"));
    }
    if result.matched_patterns().len() > 1 {
        out.push_str(&format!("\nMatched rules: {}", result.matched_ids().join(", ")));
    }
    if result.is_blocking() {
        out.push_str("\nThis command is blocked until you explicitly confirm it.");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rm_rf_root_is_critical() {
        let result = review("rm -rf /", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Critical);
        assert!(result.is_blocking());
        assert!(result.matched_ids().contains(&"rm-rf-root"));
        assert_eq!(result.safe_alternative(), Some("rm -rf ./target-directory"));
    }

    #[test]
    fn test_docker_ps_is_safe() {
        let result = review("docker ps -a", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Safe);
        assert!(!result.is_blocking());
        assert!(result.safe_alternative().is_none());
        assert!(result.matched_ids().contains(&"docker-read-only"));
    }

    #[test]
    fn test_rm_rf_variable_is_critical() {
        let result = review("rm -rf $BACKUP_DIR", Mode::Architect);
        assert_eq!(result.risk_level(), RiskLevel::Critical);
        assert!(result.matched_ids().contains(&"rm-rf-variable"));
        assert!(result.safe_alternative().unwrap().contains("-n \"$MY_DIR\""));
    }

    #[test]
    fn test_end_of_options_marker_stays_critical() {
        for cmd in ["rm -rf -- /", "rm -rf -- $BACKUP_DIR", "rm -r -f -- ~"] {
            let result = review(cmd, Mode::Beginner);
            assert_eq!(result.risk_level(), RiskLevel::Critical, "{cmd}");
            assert!(result.is_blocking());
        }
    }

    #[test]
    fn test_punctuated_secret_is_dangerous() {
        let result = review("mysql -u root password='P@ssw0rd!x'", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Dangerous);
        assert!(result.matched_ids().contains(&"hardcoded-secret"));
    }

    #[test]
    fn test_empty_command_is_safe_without_matches() {
        for input in ["", "   ", "\t\n"] {
            let result = review(input, Mode::Beginner);
            assert_eq!(result.risk_level(), RiskLevel::Safe);
            assert!(result.matched_patterns().is_empty());
            assert_eq!(result.message(), NO_MATCH_MESSAGE);
        }
    }

    #[test]
    fn test_unknown_command_is_safe_with_caveat() {
        let result = review("frobnicate --all", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Safe);
        assert!(result.matched_patterns().is_empty());
        assert!(result.explanation().contains("catalog"));
    }

    #[test]
    fn test_review_is_deterministic() {
        for cmd in ["rm -rf /", "sudo su", "git push -f", "ls -la", "curl x | sh"] {
            assert_eq!(review(cmd, Mode::Beginner), review(cmd, Mode::Beginner));
            assert_eq!(review(cmd, Mode::Architect), review(cmd, Mode::Architect));
        }
    }

    #[test]
    fn test_mode_selects_explanation() {
        let beginner = review("chmod 777 app.sh", Mode::Beginner);
        let architect = review("chmod 777 app.sh", Mode::Architect);
        assert_eq!(beginner.risk_level(), architect.risk_level());
        assert_ne!(beginner.explanation(), architect.explanation());
        assert_eq!(beginner.matched_patterns(), architect.matched_patterns());
    }

    #[test]
    fn test_highest_severity_wins() {
        let result = review("sudo rm -rf /", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Critical);
        let ids = result.matched_ids();
        assert!(ids.contains(&"sudo"));
        assert!(ids.contains(&"rm-recursive"));
        assert_eq!(result.message(), catalog().iter().find(|p| p.id == "rm-rf-root").unwrap().description);
    }

    #[test]
    fn test_matches_preserve_catalog_order() {
        let result = review("sudo rm -rf /", Mode::Beginner);
        let positions: Vec<usize> = result
            .matched_ids()
            .iter()
            .map(|id| catalog().iter().position(|p| p.id == *id).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_sudo_levels() {
        assert_eq!(review("sudo -i", Mode::Beginner).risk_level(), RiskLevel::Dangerous);
        assert_eq!(review("sudo su", Mode::Beginner).risk_level(), RiskLevel::Dangerous);
        assert_eq!(review("sudo bash", Mode::Beginner).risk_level(), RiskLevel::Dangerous);
        assert_eq!(review("sudo systemctl restart nginx", Mode::Beginner).risk_level(), RiskLevel::Caution);
        assert_eq!(review("sudo apt update", Mode::Beginner).risk_level(), RiskLevel::Caution);
    }

    #[test]
    fn test_curl_pipe_shell() {
        let result = review("curl -fsSL https://get.example.sh | bash", Mode::Beginner);
        assert_eq!(result.risk_level(), RiskLevel::Critical);
        assert!(result.safe_alternative().unwrap().starts_with("curl -o script.sh"));
    }

    #[test]
    fn test_caution_level_commands() {
        for cmd in [
            "git push --force origin main",
            "systemctl stop nginx",
            "apt-get remove nginx",
            "git reset --hard HEAD~1",
            "pkill node",
        ] {
            let result = review(cmd, Mode::Beginner);
            assert_eq!(result.risk_level(), RiskLevel::Caution, "{cmd}");
            assert!(!result.is_blocking());
        }
    }

    #[test]
    fn test_critical_level_commands() {
        for cmd in [
            "dd if=/dev/zero of=/dev/sda bs=1M",
            "mkfs.ext4 /dev/sdb1",
            ":(){ :|:& };:",
            "echo garbage > /dev/sda",
            "kubectl delete pods --all -n production",
            "psql -c 'DROP DATABASE customers'",
            "eval $(echo $PAYLOAD)",
        ] {
            assert_eq!(review(cmd, Mode::Beginner).risk_level(), RiskLevel::Critical, "{cmd}");
        }
    }

    #[test]
    fn test_format_review_includes_guidance() {
        let text = format_review(&review("chmod 777 app.sh", Mode::Beginner));
        assert!(text.starts_with("[!!] DANGEROUS"));
        assert!(text.contains("Safer alternative: chmod 644 file"));
        assert!(text.contains("Learning note:"));
        assert!(text.contains("blocked"));

        let safe = format_review(&review("ls -la", Mode::Beginner));
        assert!(safe.starts_with("[ok] SAFE"));
        assert!(!safe.contains("Safer alternative"));
    }

    #[test]
    fn test_review_serializes_pattern_ids() {
        let json = serde_json::to_value(review("sudo -s", Mode::Beginner)).unwrap();
        assert_eq!(json["risk_level"], "DANGEROUS");
        let ids = json["matched_patterns"].as_array().unwrap();
        assert!(ids.iter().any(|id| id == "sudo-unrestricted"));
    }
}
