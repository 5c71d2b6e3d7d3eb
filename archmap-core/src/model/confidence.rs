//! Per-finding confidence stamping.

use serde::{Deserialize, Serialize};

/// Confidence assigned to a finding by the parsing tier that produced it.
///
/// Tier 1 (structured parse) stamps `High`, tier 2 (regex fallback)
/// stamps `Medium`. `Low` is reserved for heuristics that never saw the
/// source at all (derived findings from post-processors may use it).
/// Totally ordered: `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Numeric score used in the quality report.
    pub fn score(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.7,
            Self::Low => 0.4,
        }
    }

    /// Stable lowercase name for display and serialization contexts.
    pub fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_totally_ordered() {
        assert!(ConfidenceLevel::Low < ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium < ConfidenceLevel::High);
    }

    #[test]
    fn scores_match_spec_levels() {
        assert_eq!(ConfidenceLevel::High.score(), 1.0);
        assert_eq!(ConfidenceLevel::Medium.score(), 0.7);
        assert_eq!(ConfidenceLevel::Low.score(), 0.4);
    }
}
