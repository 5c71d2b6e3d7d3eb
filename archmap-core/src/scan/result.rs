//! The immutable output of one analyzer.

use serde::{Deserialize, Serialize};

use super::statistics::ScanStatistics;
use crate::model::{
    ApiEndpoint, Component, DataEntity, Dependency, MessageFlow, Relationship,
};

/// Everything a single analyzer produced, plus how well it went.
///
/// Analyzers never panic or error out of `scan`; a fatal internal failure
/// becomes a result with `success == false` and at least one error line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub analyzer_id: String,
    pub success: bool,
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
    pub warnings: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub statistics: ScanStatistics,
}

impl ScanResult {
    /// A successful result with no findings.
    pub fn empty(analyzer_id: impl Into<String>) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            success: true,
            ..Default::default()
        }
    }

    /// A failed result carrying the fatal error lines.
    pub fn failed(analyzer_id: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            success: false,
            errors,
            ..Default::default()
        }
    }

    pub fn finding_count(&self) -> usize {
        self.components.len()
            + self.dependencies.len()
            + self.endpoints.len()
            + self.flows.len()
            + self.entities.len()
            + self.relationships.len()
    }
}

/// Incremental builder used by analyzers while scanning files.
#[derive(Debug, Default)]
pub struct ScanResultBuilder {
    analyzer_id: String,
    components: Vec<Component>,
    dependencies: Vec<Dependency>,
    endpoints: Vec<ApiEndpoint>,
    flows: Vec<MessageFlow>,
    entities: Vec<DataEntity>,
    relationships: Vec<Relationship>,
    warnings: Vec<String>,
    errors: Vec<String>,
    statistics: ScanStatistics,
}

impl ScanResultBuilder {
    pub fn new(analyzer_id: impl Into<String>) -> Self {
        Self {
            analyzer_id: analyzer_id.into(),
            ..Default::default()
        }
    }

    pub fn component(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn dependency(&mut self, dependency: Dependency) -> &mut Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn endpoint(&mut self, endpoint: ApiEndpoint) -> &mut Self {
        self.endpoints.push(endpoint);
        self
    }

    pub fn flow(&mut self, flow: MessageFlow) -> &mut Self {
        self.flows.push(flow);
        self
    }

    pub fn entity(&mut self, entity: DataEntity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    pub fn relationship(&mut self, relationship: Relationship) -> &mut Self {
        self.relationships.push(relationship);
        self
    }

    pub fn warning(&mut self, warning: impl Into<String>) -> &mut Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn error(&mut self, error: impl Into<String>) -> &mut Self {
        self.errors.push(error.into());
        self
    }

    pub fn statistics_mut(&mut self) -> &mut ScanStatistics {
        &mut self.statistics
    }

    /// Findings collected so far.
    pub fn finding_count(&self) -> usize {
        self.components.len()
            + self.dependencies.len()
            + self.endpoints.len()
            + self.flows.len()
            + self.entities.len()
            + self.relationships.len()
    }

    /// Absorb the findings of another builder (per-file worker merge).
    pub fn absorb(&mut self, other: ScanResultBuilder) {
        self.components.extend(other.components);
        self.dependencies.extend(other.dependencies);
        self.endpoints.extend(other.endpoints);
        self.flows.extend(other.flows);
        self.entities.extend(other.entities);
        self.relationships.extend(other.relationships);
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        self.statistics.merge(&other.statistics);
    }

    /// Finish the result. `success` is false when a timeout or fatal
    /// error was recorded.
    pub fn build(self, success: bool) -> ScanResult {
        ScanResult {
            analyzer_id: self.analyzer_id,
            success,
            components: self.components,
            dependencies: self.dependencies,
            endpoints: self.endpoints,
            flows: self.flows,
            entities: self.entities,
            relationships: self.relationships,
            warnings: self.warnings,
            errors: self.errors,
            statistics: self.statistics,
        }
    }
}
