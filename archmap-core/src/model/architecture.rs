//! The aggregated architecture model and its quality report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::api::ApiEndpoint;
use super::component::Component;
use super::confidence::ConfidenceLevel;
use super::data::DataEntity;
use super::dependency::Dependency;
use super::messaging::MessageFlow;
use super::relationship::Relationship;
use crate::scan::ScanStatistics;

/// Count of findings per confidence level across the whole model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceHistogram {
    pub fn record(&mut self, level: ConfidenceLevel) {
        match level {
            ConfidenceLevel::High => self.high += 1,
            ConfidenceLevel::Medium => self.medium += 1,
            ConfidenceLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Per-run quality signals so callers can judge how trustworthy the
/// model is before acting on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Per-analyzer success rate: (tier1 + tier2) / scanned.
    pub success_rates: BTreeMap<String, f64>,
    /// Per-analyzer coverage: scanned / discovered.
    pub coverage: BTreeMap<String, f64>,
    pub confidence: ConfidenceHistogram,
}

/// The deduplicated union of all analyzer results for one run.
///
/// Collections preserve first-seen order under their semantic keys; the
/// model is a plain value and is never mutated after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureModel {
    pub project_name: String,
    #[serde(default)]
    pub project_version: String,
    #[serde(default)]
    pub source_paths: Vec<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub endpoints: Vec<ApiEndpoint>,
    #[serde(default)]
    pub flows: Vec<MessageFlow>,
    #[serde(default)]
    pub entities: Vec<DataEntity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub quality: QualityReport,
    /// Parse statistics keyed by analyzer id.
    #[serde(default)]
    pub statistics: BTreeMap<String, ScanStatistics>,
}

impl ArchitectureModel {
    pub fn new(project_name: impl Into<String>, project_version: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_version: project_version.into(),
            ..Default::default()
        }
    }

    /// Total number of findings across all entity collections.
    pub fn finding_count(&self) -> usize {
        self.components.len()
            + self.dependencies.len()
            + self.endpoints.len()
            + self.flows.len()
            + self.entities.len()
            + self.relationships.len()
    }

    /// Serialize with all collections sorted by semantic key.
    ///
    /// Two runs over the same tree produce byte-identical output here,
    /// which is what the determinism tests assert.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        let mut sorted = self.clone();
        sorted.components.sort_by_key(|c| c.semantic_key());
        sorted.dependencies.sort_by_key(|d| d.semantic_key());
        sorted.endpoints.sort_by_key(|e| e.semantic_key());
        sorted.flows.sort_by_key(|f| f.semantic_key());
        sorted.entities.sort_by_key(|e| e.semantic_key());
        sorted.relationships.sort_by_key(|r| r.semantic_key());
        serde_json::to_string_pretty(&sorted)
    }
}
