//! Configuration schema and loader.
//!
//! The CLI hands the core a parsed [`ArchmapConfig`]; everything here is
//! plain serde with `effective_*()` accessors supplying defaults, so a
//! missing file or empty section behaves the same as an explicit default.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How the driver decides which analyzers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScannerMode {
    /// All registered analyzers are candidates; `applies` decides.
    #[default]
    Auto,
    /// Only analyzers whose language tags intersect `scanners.groups`.
    Groups,
    /// Only analyzers listed in `scanners.enabled`.
    Explicit,
}

/// `project:` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

/// One entry of the `repositories:` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub path: String,
}

/// `scanners:` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScannersConfig {
    pub mode: ScannerMode,
    /// Technology groups used in GROUPS mode (matched against analyzer
    /// language tags, case-insensitive).
    pub groups: Vec<String>,
    /// Analyzer ids used in EXPLICIT mode.
    pub enabled: Vec<String>,
    /// Per-analyzer configuration, keyed by analyzer id.
    pub config: BTreeMap<String, BTreeMap<String, serde_yaml::Value>>,
    /// Per-analyzer wall-clock budget in seconds.
    pub timeout_seconds: Option<u64>,
    /// Cap on bytes read from a single file.
    pub max_file_size: Option<u64>,
    /// Per-file parallelism inside one analyzer. 0 = auto.
    pub parallelism: Option<usize>,
    /// Follow symbolic links while walking. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Additional ignore patterns beyond the built-in set.
    pub extra_ignore: Vec<String>,
}

impl ScannersConfig {
    /// Default 5 minutes per analyzer.
    pub fn effective_timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(300)
    }

    /// Default 2 MiB per file.
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(2 * 1024 * 1024)
    }

    /// Default `min(8, cpus)`.
    pub fn effective_parallelism(&self) -> usize {
        match self.parallelism {
            Some(n) if n > 0 => n,
            _ => std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(1),
        }
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }
}

/// `generators:` section (consumed by archmap-render, not the core).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorsConfig {
    pub default: Option<String>,
    pub enabled: Vec<String>,
}

/// `output:` section (consumed by the CLI, not the core).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: Option<String>,
    pub generate_index: Option<bool>,
}

/// Top-level configuration value.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArchmapConfig {
    pub project: ProjectConfig,
    pub repositories: Vec<RepositoryConfig>,
    pub scanners: ScannersConfig,
    pub generators: GeneratorsConfig,
    pub output: OutputConfig,
}

impl ArchmapConfig {
    /// Load a YAML configuration file. Invalid YAML is a fatal
    /// configuration error (the one error class that stops the run).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::parse(&text).map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse a YAML configuration string.
    pub fn parse(text: &str) -> Result<Self, String> {
        serde_yaml::from_str(text).map_err(|e| e.to_string())
    }

    /// The effective project name, falling back to "unnamed".
    pub fn effective_project_name(&self) -> &str {
        if self.project.name.is_empty() {
            "unnamed"
        } else {
            &self.project.name
        }
    }

    /// Config section for one analyzer (empty map when absent).
    pub fn analyzer_config(&self, analyzer_id: &str) -> BTreeMap<String, serde_yaml::Value> {
        self.scanners
            .config
            .get(analyzer_id)
            .cloned()
            .unwrap_or_default()
    }
}
