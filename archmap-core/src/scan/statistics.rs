//! Per-analyzer parse-quality statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Classification of a per-file failure or skip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Parse,
    Io,
    UnsupportedFeature,
    SizeLimit,
    Timeout,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Io => "io",
            Self::UnsupportedFeature => "unsupported-feature",
            Self::SizeLimit => "size-limit",
            Self::Timeout => "timeout",
        }
    }
}

/// Maximum number of distinct error messages retained.
pub const TOP_ERROR_LIMIT: usize = 10;

/// Maximum retained length of a single error message.
pub const ERROR_MESSAGE_TRUNCATE: usize = 200;

/// One retained error message with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessageCount {
    pub message: String,
    pub count: u64,
}

/// Parse-quality counters for a single analyzer run.
///
/// Invariant: `files_discovered >= files_scanned >= parsed_successfully +
/// parsed_with_fallback + failed + skipped`. A file is counted in exactly
/// one of the four outcome buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub files_discovered: u64,
    pub files_scanned: u64,
    /// Tier 1: structured parse succeeded.
    pub parsed_successfully: u64,
    /// Tier 2: regex fallback produced the findings.
    pub parsed_with_fallback: u64,
    /// Tier 3: both tiers failed.
    pub failed: u64,
    /// Rejected by the pre-filter or a size cap; never handed to tier 1.
    pub skipped: u64,
    /// Failure counts by error kind.
    #[serde(default)]
    pub error_kinds: BTreeMap<ErrorKind, u64>,
    /// The most frequent error messages, at most [`TOP_ERROR_LIMIT`].
    #[serde(default)]
    pub top_errors: Vec<ErrorMessageCount>,
}

impl ScanStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_discovered(&mut self, count: u64) {
        self.files_discovered += count;
    }

    pub fn record_scanned(&mut self) {
        self.files_scanned += 1;
    }

    pub fn record_parsed(&mut self) {
        self.parsed_successfully += 1;
    }

    pub fn record_fallback(&mut self) {
        self.parsed_with_fallback += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record a tier-3 failure with its kind and message.
    ///
    /// The message is truncated to [`ERROR_MESSAGE_TRUNCATE`] characters;
    /// the retained list keeps the most frequent messages, capped at
    /// [`TOP_ERROR_LIMIT`].
    pub fn record_failure(&mut self, kind: ErrorKind, message: &str) {
        self.failed += 1;
        *self.error_kinds.entry(kind).or_insert(0) += 1;

        let message: String = message.chars().take(ERROR_MESSAGE_TRUNCATE).collect();
        if let Some(existing) = self.top_errors.iter_mut().find(|e| e.message == message) {
            existing.count += 1;
        } else if self.top_errors.len() < TOP_ERROR_LIMIT {
            self.top_errors.push(ErrorMessageCount { message, count: 1 });
        }
        self.top_errors.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message))
        });
    }

    /// Sum of the four per-file outcome buckets.
    pub fn outcome_total(&self) -> u64 {
        self.parsed_successfully + self.parsed_with_fallback + self.failed + self.skipped
    }

    /// Check the counter invariant.
    pub fn is_consistent(&self) -> bool {
        self.files_discovered >= self.files_scanned
            && self.files_scanned >= self.outcome_total()
            && self.top_errors.len() <= TOP_ERROR_LIMIT
    }

    /// (tier1 + tier2) / scanned; 1.0 when nothing was scanned.
    pub fn success_rate(&self) -> f64 {
        if self.files_scanned == 0 {
            return 1.0;
        }
        (self.parsed_successfully + self.parsed_with_fallback) as f64 / self.files_scanned as f64
    }

    /// Merge another statistics block into this one (used when an
    /// analyzer scans several search roots).
    pub fn merge(&mut self, other: &ScanStatistics) {
        self.files_discovered += other.files_discovered;
        self.files_scanned += other.files_scanned;
        self.parsed_successfully += other.parsed_successfully;
        self.parsed_with_fallback += other.parsed_with_fallback;
        self.failed += other.failed;
        self.skipped += other.skipped;
        for (kind, count) in &other.error_kinds {
            *self.error_kinds.entry(*kind).or_insert(0) += count;
        }
        for entry in &other.top_errors {
            if let Some(existing) = self
                .top_errors
                .iter_mut()
                .find(|e| e.message == entry.message)
            {
                existing.count += entry.count;
            } else if self.top_errors.len() < TOP_ERROR_LIMIT {
                self.top_errors.push(entry.clone());
            }
        }
        self.top_errors.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message))
        });
    }
}
