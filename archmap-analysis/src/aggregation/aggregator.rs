//! The aggregator: semantic-key deduplication plus the quality report.

use archmap_core::collections::FxHashSet;
use archmap_core::model::{ArchitectureModel, ConfidenceHistogram, QualityReport};
use archmap_core::scan::ScanResult;

/// Merges ScanResults into one deduplicated [`ArchitectureModel`].
///
/// Deduplication is stable: within each entity kind the first occurrence
/// of a semantic key wins, in the order results are handed in (which is
/// the driver's execution order).
pub struct Aggregator {
    project_name: String,
    project_version: String,
    source_paths: Vec<String>,
}

impl Aggregator {
    pub fn new(project_name: impl Into<String>, project_version: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            project_version: project_version.into(),
            source_paths: Vec::new(),
        }
    }

    pub fn with_source_paths(mut self, paths: Vec<String>) -> Self {
        self.source_paths = paths;
        self
    }

    /// Merge results; failed analyzers contribute statistics and errors
    /// but no findings.
    pub fn aggregate(&self, results: &[(String, &ScanResult)]) -> ArchitectureModel {
        let mut model = ArchitectureModel::new(&self.project_name, &self.project_version);
        model.source_paths = self.source_paths.clone();

        let mut component_keys = FxHashSet::default();
        let mut dependency_keys = FxHashSet::default();
        let mut endpoint_keys = FxHashSet::default();
        let mut flow_keys = FxHashSet::default();
        let mut entity_keys = FxHashSet::default();
        let mut relationship_keys = FxHashSet::default();

        let mut histogram = ConfidenceHistogram::default();

        for (analyzer_id, result) in results {
            model
                .statistics
                .insert(analyzer_id.clone(), result.statistics.clone());

            if !result.success && result.finding_count() == 0 {
                continue;
            }

            for component in &result.components {
                if component_keys.insert(component.semantic_key()) {
                    histogram.record(component.confidence);
                    model.components.push(component.clone());
                }
            }
            for dependency in &result.dependencies {
                if dependency_keys.insert(dependency.semantic_key()) {
                    histogram.record(dependency.confidence);
                    model.dependencies.push(dependency.clone());
                }
            }
            for endpoint in &result.endpoints {
                if endpoint_keys.insert(endpoint.semantic_key()) {
                    histogram.record(endpoint.confidence);
                    model.endpoints.push(endpoint.clone());
                }
            }
            for flow in &result.flows {
                if flow_keys.insert(flow.semantic_key()) {
                    histogram.record(flow.confidence);
                    model.flows.push(flow.clone());
                }
            }
            for entity in &result.entities {
                if entity_keys.insert(entity.semantic_key()) {
                    histogram.record(entity.confidence);
                    model.entities.push(entity.clone());
                }
            }
            for relationship in &result.relationships {
                if relationship_keys.insert(relationship.semantic_key()) {
                    histogram.record(relationship.confidence);
                    model.relationships.push(relationship.clone());
                }
            }
        }

        let mut quality = QualityReport {
            confidence: histogram,
            ..Default::default()
        };
        for (analyzer_id, result) in results {
            let stats = &result.statistics;
            quality
                .success_rates
                .insert(analyzer_id.clone(), stats.success_rate());
            let coverage = if stats.files_discovered == 0 {
                1.0
            } else {
                stats.files_scanned as f64 / stats.files_discovered as f64
            };
            quality.coverage.insert(analyzer_id.clone(), coverage);
        }
        model.quality = quality;

        model
    }
}

#[cfg(test)]
mod tests {
    use archmap_core::model::{ApiEndpoint, ApiKind, Component, ComponentType, Dependency};
    use archmap_core::scan::ScanResult;

    use super::*;

    fn result_with(analyzer_id: &str, deps: &[(&str, &str, &str)]) -> ScanResult {
        let mut result = ScanResult::empty(analyzer_id);
        result
            .components
            .push(Component::new("backend", ComponentType::Service));
        for (group, artifact, version) in deps {
            result
                .dependencies
                .push(Dependency::new("c", *group, *artifact, *version));
        }
        result
    }

    #[test]
    fn first_seen_wins_across_analyzers() {
        let first = result_with("maven-deps", &[("g", "a", "1")]);
        let second = result_with("gradle-deps", &[("g", "a", "1"), ("g", "b", "2")]);

        let model = Aggregator::new("p", "1").aggregate(&[
            ("maven-deps".to_string(), &first),
            ("gradle-deps".to_string(), &second),
        ]);

        // The duplicate component and dependency collapse.
        assert_eq!(model.components.len(), 1);
        assert_eq!(model.dependencies.len(), 2);
        assert_eq!(model.statistics.len(), 2);
    }

    #[test]
    fn failed_results_contribute_no_findings() {
        let mut failed = result_with("spring-rest", &[]);
        failed.success = false;
        failed
            .endpoints
            .push(ApiEndpoint::new("c", ApiKind::Rest, "GET", "/partial"));
        failed.components.clear();
        failed.dependencies.clear();

        // A failed result with findings is a partial (timeout) result and
        // keeps them; a failed result without findings adds nothing.
        let model = Aggregator::new("p", "1")
            .aggregate(&[("spring-rest".to_string(), &failed)]);
        assert_eq!(model.endpoints.len(), 1);

        let empty_failed = ScanResult::failed("kafka-flows", vec!["boom".to_string()]);
        let model = Aggregator::new("p", "1")
            .aggregate(&[("kafka-flows".to_string(), &empty_failed)]);
        assert_eq!(model.finding_count(), 0);
        assert!(model.statistics.contains_key("kafka-flows"));
    }

    #[test]
    fn histogram_counts_unique_findings_only() {
        let first = result_with("maven-deps", &[("g", "a", "1")]);
        let second = result_with("gradle-deps", &[("g", "a", "1")]);
        let model = Aggregator::new("p", "1").aggregate(&[
            ("maven-deps".to_string(), &first),
            ("gradle-deps".to_string(), &second),
        ]);
        assert_eq!(model.quality.confidence.total(), model.finding_count());
    }
}
