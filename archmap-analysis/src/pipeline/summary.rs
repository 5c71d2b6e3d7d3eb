//! Per-run outcome accounting.

use serde::{Deserialize, Serialize};

/// What happened to one analyzer during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerOutcome {
    Executed,
    DisabledByMode,
    NotApplicable,
    Failed,
    TimedOut,
}

/// Counts by outcome plus operator-facing warnings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub executed: usize,
    pub disabled: usize,
    pub not_applicable: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Analyzer ids named in EXPLICIT mode that are not registered.
    pub unknown_ids: Vec<String>,
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: AnalyzerOutcome) {
        match outcome {
            AnalyzerOutcome::Executed => self.executed += 1,
            AnalyzerOutcome::DisabledByMode => self.disabled += 1,
            AnalyzerOutcome::NotApplicable => self.not_applicable += 1,
            AnalyzerOutcome::Failed => self.failed += 1,
            AnalyzerOutcome::TimedOut => self.timed_out += 1,
        }
    }
}
