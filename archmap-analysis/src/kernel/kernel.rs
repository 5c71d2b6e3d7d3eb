//! The analyzer kernel: per-file iteration with the three-tier parsing
//! fallback.
//!
//! Tier 1 is the structured parse (HIGH confidence), tier 2 the opt-in
//! regex fallback (MEDIUM), tier 3 the recorded failure. Tier decisions
//! depend only on returned values — panics inside an extractor are
//! caught and downgrade exactly like an error return.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use archmap_core::errors::{ParseError, ScanError};
use archmap_core::model::ConfidenceLevel;
use archmap_core::scan::statistics::ErrorKind;
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResultBuilder};
use rayon::prelude::*;

use super::findings::Findings;
use super::prefilter::{NameDecision, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::index::FileIndex;

/// Shared services handed to every analyzer at construction time.
///
/// The parser registry lives here, injected rather than discovered, so a
/// missing grammar degrades predictably to the regex tier.
pub struct AnalyzerServices {
    pub parsers: Arc<ParserManager>,
    pub max_file_size: u64,
    pub parallelism: usize,
}

impl AnalyzerServices {
    pub fn new(max_file_size: u64, parallelism: usize) -> Self {
        Self {
            parsers: Arc::new(ParserManager::new()),
            max_file_size,
            parallelism,
        }
    }
}

impl Default for AnalyzerServices {
    fn default() -> Self {
        Self::new(2 * 1024 * 1024, 1)
    }
}

/// Tier-1 extractor: structured parse of one file.
pub type TierOneFn<'a> = &'a (dyn Fn(&DiscoveredFile, &str) -> Result<Findings, ParseError> + Sync);

/// Tier-2 extractor: regex fallback over the raw content.
pub type TierTwoFn<'a> = &'a (dyn Fn(&DiscoveredFile, &str) -> Findings + Sync);

enum FileOutcome {
    Skipped,
    SkippedSize(String),
    Parsed(Findings),
    Fallback(Findings),
    Failed(ErrorKind, String),
    DeadlineHit,
}

/// Per-analyzer kernel value; concrete analyzers embed one and inject
/// their extractors as closures.
pub struct AnalyzerKernel {
    analyzer_id: String,
    max_file_size: u64,
    /// Per-file line cap; files over it are skipped, never streamed.
    max_lines: Option<usize>,
    parallelism: usize,
}

impl AnalyzerKernel {
    pub fn new(analyzer_id: impl Into<String>, services: &AnalyzerServices) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            max_file_size: services.max_file_size,
            max_lines: None,
            parallelism: services.parallelism.max(1),
        }
    }

    /// A kernel with tightened per-file limits. The byte cap can only
    /// shrink below the global one; the line cap applies on top of it.
    /// Schema analyzers use this with their family defaults (possibly
    /// overridden from the analyzer config).
    pub fn limited(&self, max_file_size: u64, max_lines: usize) -> Self {
        Self {
            analyzer_id: self.analyzer_id.clone(),
            max_file_size: self.max_file_size.min(max_file_size),
            max_lines: Some(max_lines),
            parallelism: self.parallelism,
        }
    }

    pub fn analyzer_id(&self) -> &str {
        &self.analyzer_id
    }

    /// Build the file index for this context.
    pub fn index(&self, ctx: &ScanContext) -> FileIndex {
        FileIndex::new(Arc::clone(&ctx.files), self.max_file_size)
    }

    /// Run the tiered loop over every file matching `globs`.
    ///
    /// Returns true when the deadline cut the run short; the caller then
    /// finishes the result with `success = false` and a timeout error.
    pub fn process_files(
        &self,
        ctx: &ScanContext,
        globs: &[String],
        prefilter: &PreFilter,
        tier_one: TierOneFn,
        tier_two: Option<TierTwoFn>,
        builder: &mut ScanResultBuilder,
    ) -> bool {
        let index = self.index(ctx);
        let candidates: Vec<DiscoveredFile> =
            index.find_files_any(globs).cloned().collect();
        builder
            .statistics_mut()
            .record_discovered(candidates.len() as u64);

        let outcomes: Vec<FileOutcome> = if self.parallelism > 1 && candidates.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.parallelism)
                .build();
            match pool {
                Ok(pool) => pool.install(|| {
                    candidates
                        .par_iter()
                        .map(|file| {
                            self.process_one(ctx, &index, prefilter, tier_one, tier_two, file)
                        })
                        .collect()
                }),
                Err(_) => candidates
                    .iter()
                    .map(|file| self.process_one(ctx, &index, prefilter, tier_one, tier_two, file))
                    .collect(),
            }
        } else {
            candidates
                .iter()
                .map(|file| self.process_one(ctx, &index, prefilter, tier_one, tier_two, file))
                .collect()
        };

        // Fold outcomes in candidate (sorted-path) order so committed
        // findings are deterministic regardless of worker scheduling.
        let mut timed_out = false;
        for outcome in outcomes {
            match outcome {
                FileOutcome::DeadlineHit => {
                    timed_out = true;
                }
                FileOutcome::Skipped => {
                    let stats = builder.statistics_mut();
                    stats.record_scanned();
                    stats.record_skipped();
                }
                FileOutcome::SkippedSize(warning) => {
                    let stats = builder.statistics_mut();
                    stats.record_scanned();
                    stats.record_skipped();
                    builder.warning(warning);
                }
                FileOutcome::Parsed(findings) => {
                    let stats = builder.statistics_mut();
                    stats.record_scanned();
                    stats.record_parsed();
                    findings.commit(builder);
                }
                FileOutcome::Fallback(findings) => {
                    let stats = builder.statistics_mut();
                    stats.record_scanned();
                    stats.record_fallback();
                    findings.commit(builder);
                }
                FileOutcome::Failed(kind, message) => {
                    let stats = builder.statistics_mut();
                    stats.record_scanned();
                    stats.record_failure(kind, &message);
                }
            }
        }
        timed_out
    }

    fn process_one(
        &self,
        ctx: &ScanContext,
        index: &FileIndex,
        prefilter: &PreFilter,
        tier_one: TierOneFn,
        tier_two: Option<TierTwoFn>,
        file: &DiscoveredFile,
    ) -> FileOutcome {
        if ctx.deadline_exceeded() {
            return FileOutcome::DeadlineHit;
        }

        let decision = prefilter.name_stage(file);
        if decision == NameDecision::Skip {
            return FileOutcome::Skipped;
        }

        let text = match index.read_text(file) {
            Ok(text) => text,
            Err(ScanError::SizeLimit { size, limit, .. }) => {
                return FileOutcome::SkippedSize(format!(
                    "{}: file exceeds size cap ({size} > {limit} bytes), skipped",
                    file.relative
                ));
            }
            Err(error) => {
                tracing::warn!(
                    analyzer = %self.analyzer_id,
                    path = %file.relative,
                    error = %error,
                    "file read failed"
                );
                return FileOutcome::Failed(ErrorKind::Io, error.to_string());
            }
        };

        if let Some(max_lines) = self.max_lines {
            let lines = text.lines().count();
            if lines > max_lines {
                return FileOutcome::SkippedSize(format!(
                    "{}: file exceeds line cap ({lines} > {max_lines} lines), skipped",
                    file.relative
                ));
            }
        }

        if decision == NameDecision::NeedContent && !prefilter.content_stage(&text) {
            return FileOutcome::Skipped;
        }

        // Tier 1: structured parse.
        let tier_one_result =
            catch_unwind(AssertUnwindSafe(|| tier_one(file, &text))).unwrap_or_else(|_| {
                Err(ParseError::Syntax {
                    path: file.path.clone(),
                    message: "extractor panicked".to_string(),
                })
            });

        let parse_error = match tier_one_result {
            Ok(mut findings) => {
                findings.cap_confidence(ConfidenceLevel::High);
                return FileOutcome::Parsed(findings);
            }
            Err(error) => error,
        };

        // Tier 2: opt-in regex fallback. Empty output means the file
        // carried nothing recoverable — that is a failure, not success.
        if let Some(fallback) = tier_two {
            let recovered = catch_unwind(AssertUnwindSafe(|| fallback(file, &text))).ok();
            if let Some(mut findings) = recovered {
                if !findings.is_empty() {
                    findings.cap_confidence(ConfidenceLevel::Medium);
                    return FileOutcome::Fallback(findings);
                }
            }
        }

        // Tier 3: recorded failure.
        FileOutcome::Failed(parse_error.error_kind(), parse_error.to_string())
    }
}
