//! The immutable input handed to every analyzer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::files::FileSet;
use super::result::ScanResult;

/// Everything an analyzer is allowed to see.
///
/// The context is a read-only snapshot: prior results are shared behind
/// `Arc` and must not be mutated, the file set was walked once by the
/// driver, and the deadline enables cooperative cancellation — analyzers
/// check it at file boundaries.
#[derive(Clone)]
pub struct ScanContext {
    /// Scan root (absolute).
    pub root: PathBuf,
    /// Ordered search roots; defaults to `[root]`.
    pub search_roots: Vec<PathBuf>,
    /// Analyzer-specific configuration (`scanners.config.<id>`).
    pub config: BTreeMap<String, serde_yaml::Value>,
    /// Free-form variables (e.g. interpolation values) shared per run.
    pub variables: BTreeMap<String, String>,
    /// Files discovered by the driver's single walk.
    pub files: Arc<FileSet>,
    /// Results of analyzers that already ran, keyed by analyzer id.
    pub previous_results: Arc<BTreeMap<String, Arc<ScanResult>>>,
    /// Cooperative cancellation deadline.
    pub deadline: Option<Instant>,
}

impl ScanContext {
    pub fn new(root: impl Into<PathBuf>, files: Arc<FileSet>) -> Self {
        let root = root.into();
        Self {
            search_roots: vec![root.clone()],
            root,
            config: BTreeMap::new(),
            variables: BTreeMap::new(),
            files,
            previous_results: Arc::new(BTreeMap::new()),
            deadline: None,
        }
    }

    pub fn with_config(mut self, config: BTreeMap<String, serde_yaml::Value>) -> Self {
        self.config = config;
        self
    }

    pub fn with_previous_results(
        mut self,
        results: Arc<BTreeMap<String, Arc<ScanResult>>>,
    ) -> Self {
        self.previous_results = results;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// True once the analyzer's time budget is spent.
    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Result of a prior analyzer, if it ran.
    pub fn previous_result(&self, analyzer_id: &str) -> Option<&Arc<ScanResult>> {
        self.previous_results.get(analyzer_id)
    }

    /// A config value for this analyzer, as a string.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }

    /// A config value for this analyzer, as an unsigned integer.
    pub fn config_u64(&self, key: &str) -> Option<u64> {
        self.config.get(key).and_then(|v| v.as_u64())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
