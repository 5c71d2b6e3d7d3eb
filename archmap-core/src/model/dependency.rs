//! Package-level dependency edges.

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;

/// Normalized dependency scope across package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Compile,
    Runtime,
    Test,
    Development,
}

impl DependencyScope {
    /// Normalize a manager-specific scope string.
    ///
    /// Unknown scopes map to `Compile` — manifests invent scope names
    /// freely and a wrong guess is better surfaced than dropped.
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "test" | "testcompile" | "testimplementation" | "testruntimeonly" => Self::Test,
            "runtime" | "runtimeonly" | "provided" => Self::Runtime,
            "dev" | "development" | "devdependencies" | "develop" => Self::Development,
            _ => Self::Compile,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::Development => "development",
        }
    }
}

/// One declared dependency of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Component that declares the dependency.
    pub source_component_id: String,
    /// Group/organization (empty for managers without the concept).
    #[serde(default)]
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub scope: DependencyScope,
    /// True for dependencies declared directly in the manifest.
    #[serde(default = "default_true")]
    pub direct: bool,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

fn default_true() -> bool {
    true
}

impl Dependency {
    pub fn new(
        source_component_id: impl Into<String>,
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            source_component_id: source_component_id.into(),
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            scope: DependencyScope::Compile,
            direct: true,
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_scope(mut self, scope: DependencyScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key: source + group + artifact + version.
    pub fn semantic_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.source_component_id, self.group_id, self.artifact_id, self.version
        )
    }
}
