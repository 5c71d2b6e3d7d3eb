//! Event handler trait implemented by front-ends (CLI progress, tests).

use super::types::*;

/// Receives pipeline progress. All methods default to no-ops so handlers
/// implement only what they observe.
pub trait ScanEventHandler: Send + Sync {
    fn on_pipeline_started(&self, _event: &PipelineStartedEvent) {}
    fn on_analyzer_started(&self, _event: &AnalyzerStartedEvent) {}
    fn on_analyzer_skipped(&self, _event: &AnalyzerSkippedEvent) {}
    fn on_analyzer_completed(&self, _event: &AnalyzerCompletedEvent) {}
    fn on_pipeline_completed(&self, _event: &PipelineCompletedEvent) {}
}

/// Handler that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventHandler;

impl ScanEventHandler for NullEventHandler {}
