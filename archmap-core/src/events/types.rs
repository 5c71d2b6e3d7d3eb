//! Event payloads emitted by the pipeline driver.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PipelineStartedEvent {
    pub root: PathBuf,
    pub analyzer_count: usize,
}

#[derive(Debug, Clone)]
pub struct AnalyzerStartedEvent {
    pub analyzer_id: String,
    pub priority: i32,
}

/// Why an analyzer did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DisabledByMode,
    NotApplicable,
}

#[derive(Debug, Clone)]
pub struct AnalyzerSkippedEvent {
    pub analyzer_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct AnalyzerCompletedEvent {
    pub analyzer_id: String,
    pub success: bool,
    pub finding_count: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct PipelineCompletedEvent {
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}
