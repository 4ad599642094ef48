use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Severity ranking of a candidate shell command.
///
/// Variants are declared in ascending order, so the derived `Ord` gives
/// `Safe < Caution < Dangerous < Critical`. Review picks the maximum of all
/// matched levels and confirmation policy compares against [RiskLevel::Dangerous].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// No known risk relative to the pattern catalog
    #[default]
    Safe,
    /// Worth a second look before running
    Caution,
    /// Can cause damage that is hard to undo
    Dangerous,
    /// Can destroy the system or its data
    Critical,
}

impl RiskLevel {
    pub const VALUES: &[RiskLevel] = &[RiskLevel::Safe, RiskLevel::Caution, RiskLevel::Dangerous, RiskLevel::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Caution => "CAUTION",
            RiskLevel::Dangerous => "DANGEROUS",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Returns true when this level mandates explicit confirmation
    pub fn is_blocking(&self) -> bool {
        *self >= RiskLevel::Dangerous
    }

    /// Compact marker used by terminal front ends
    pub fn symbol(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "[ok]",
            RiskLevel::Caution => "[!]",
            RiskLevel::Dangerous => "[!!]",
            RiskLevel::Critical => "[!!!]",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "safe" => Ok(RiskLevel::Safe),
            "caution" => Ok(RiskLevel::Caution),
            "dangerous" => Ok(RiskLevel::Dangerous),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(crate::Error::Config(ConfigError::InvalidRiskLevel(s.to_string()).to_string())),
        }
    }
}
