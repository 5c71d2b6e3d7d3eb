//! The pipeline driver.
//!
//! Analyzers run strictly sequentially in priority order because later
//! analyzers read earlier results via `previous_results`; per-file
//! parallelism lives inside the kernel instead.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use archmap_core::config::{ArchmapConfig, ScannerMode};
use archmap_core::errors::ScanError;
use archmap_core::events::{
    AnalyzerCompletedEvent, AnalyzerSkippedEvent, AnalyzerStartedEvent, PipelineCompletedEvent,
    PipelineStartedEvent, SkipReason,
};
use archmap_core::scan::{ScanContext, ScanResult};
use archmap_core::ScanEventHandler;

use super::summary::{AnalyzerOutcome, RunSummary};
use crate::analyzers::{Analyzer, AnalyzerRegistry};
use crate::kernel::AnalyzerServices;
use crate::scanner::walker;

/// Results of one pipeline run, in execution order.
pub struct PipelineRun {
    pub results: Vec<(String, Arc<ScanResult>)>,
    pub summary: RunSummary,
}

/// Drives one scan root through every registered analyzer.
pub struct PipelineDriver {
    analyzers: Vec<Box<dyn Analyzer>>,
    registered_ids: Vec<&'static str>,
}

impl PipelineDriver {
    /// Construct all analyzers from the registry, sorted by descending
    /// priority then ascending id (deterministic within a band).
    ///
    /// The post-processor band (≥ 150) is a separate phase: those
    /// analyzers consume everyone else's results, so they execute after
    /// the file-scanning bands regardless of their priority numbers.
    pub fn new(registry: &AnalyzerRegistry, services: &AnalyzerServices) -> Self {
        let mut analyzers = registry.construct_all(services);
        analyzers.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.id().cmp(b.id()))
        });
        let (post, mut scanning): (Vec<_>, Vec<_>) = analyzers
            .into_iter()
            .partition(|a| a.priority() >= crate::analyzers::priority::POST_PROCESS);
        scanning.extend(post);
        Self {
            analyzers: scanning,
            registered_ids: registry.ids().collect(),
        }
    }

    /// All constructed analyzers in execution order.
    pub fn registered_analyzers(&self) -> impl Iterator<Item = &dyn Analyzer> {
        self.analyzers.iter().map(|a| a.as_ref())
    }

    /// Run the pipeline over one root.
    pub fn run(
        &self,
        root: &Path,
        config: &ArchmapConfig,
        events: &dyn ScanEventHandler,
    ) -> Result<PipelineRun, ScanError> {
        let run_start = Instant::now();
        let mut summary = RunSummary::default();

        // Unknown ids in EXPLICIT mode warn but never fail the run.
        if config.scanners.mode == ScannerMode::Explicit {
            for id in &config.scanners.enabled {
                if !self.registered_ids.iter().any(|r| *r == id.as_str()) {
                    let warning = format!(
                        "unknown analyzer id '{id}' in scanners.enabled; available: {}",
                        self.registered_ids.join(", ")
                    );
                    tracing::warn!(analyzer = %id, "unknown analyzer id in EXPLICIT mode");
                    summary.unknown_ids.push(id.clone());
                    summary.warnings.push(warning);
                }
            }
        }

        // One walk per run; every analyzer queries the same snapshot.
        let files = Arc::new(walker::walk_directory(root, &config.scanners)?);

        events.on_pipeline_started(&PipelineStartedEvent {
            root: root.to_path_buf(),
            analyzer_count: self.analyzers.len(),
        });

        let timeout = Duration::from_secs(config.scanners.effective_timeout_seconds());
        let mut previous: BTreeMap<String, Arc<ScanResult>> = BTreeMap::new();
        let mut results: Vec<(String, Arc<ScanResult>)> = Vec::new();

        for analyzer in &self.analyzers {
            let id = analyzer.id();

            if !mode_allows(config, analyzer.as_ref()) {
                summary.record(AnalyzerOutcome::DisabledByMode);
                events.on_analyzer_skipped(&AnalyzerSkippedEvent {
                    analyzer_id: id.to_string(),
                    reason: SkipReason::DisabledByMode,
                });
                continue;
            }

            let ctx = ScanContext::new(root, Arc::clone(&files))
                .with_config(config.analyzer_config(id))
                .with_previous_results(Arc::new(previous.clone()))
                .with_deadline(Instant::now() + timeout);

            // An exception in `applies` is treated as `false`.
            let applies = catch_unwind(AssertUnwindSafe(|| analyzer.applies(&ctx)))
                .unwrap_or_else(|_| {
                    tracing::warn!(analyzer = id, "applies() panicked, treating as false");
                    false
                });
            if !applies {
                summary.record(AnalyzerOutcome::NotApplicable);
                events.on_analyzer_skipped(&AnalyzerSkippedEvent {
                    analyzer_id: id.to_string(),
                    reason: SkipReason::NotApplicable,
                });
                continue;
            }

            events.on_analyzer_started(&AnalyzerStartedEvent {
                analyzer_id: id.to_string(),
                priority: analyzer.priority(),
            });

            let scan_start = Instant::now();
            let result = catch_unwind(AssertUnwindSafe(|| analyzer.scan(&ctx)))
                .unwrap_or_else(|_| {
                    tracing::error!(analyzer = id, "scan panicked");
                    ScanResult::failed(id, vec!["analyzer panicked during scan".to_string()])
                });
            let duration_ms = scan_start.elapsed().as_millis() as u64;

            let timed_out = result.errors.iter().any(|e| e.starts_with("timeout"));
            let outcome = if timed_out {
                AnalyzerOutcome::TimedOut
            } else if result.success {
                AnalyzerOutcome::Executed
            } else {
                AnalyzerOutcome::Failed
            };
            summary.record(outcome);

            events.on_analyzer_completed(&AnalyzerCompletedEvent {
                analyzer_id: id.to_string(),
                success: result.success,
                finding_count: result.finding_count(),
                duration_ms,
            });
            tracing::debug!(
                analyzer = id,
                success = result.success,
                findings = result.finding_count(),
                duration_ms,
                "analyzer finished"
            );

            let result = Arc::new(result);
            previous.insert(id.to_string(), Arc::clone(&result));
            results.push((id.to_string(), result));
        }

        summary.duration_ms = run_start.elapsed().as_millis() as u64;
        events.on_pipeline_completed(&PipelineCompletedEvent {
            executed: summary.executed,
            skipped: summary.disabled + summary.not_applicable,
            failed: summary.failed + summary.timed_out,
            duration_ms: summary.duration_ms,
        });

        Ok(PipelineRun { results, summary })
    }
}

/// AUTO runs everything, GROUPS matches language tags, EXPLICIT matches
/// listed ids.
fn mode_allows(config: &ArchmapConfig, analyzer: &dyn Analyzer) -> bool {
    match config.scanners.mode {
        ScannerMode::Auto => true,
        ScannerMode::Groups => {
            let groups: Vec<String> = config
                .scanners
                .groups
                .iter()
                .map(|g| g.to_ascii_lowercase())
                .collect();
            analyzer
                .languages()
                .iter()
                .any(|lang| groups.contains(&lang.to_ascii_lowercase()))
        }
        ScannerMode::Explicit => config
            .scanners
            .enabled
            .iter()
            .any(|id| id == analyzer.id()),
    }
}
