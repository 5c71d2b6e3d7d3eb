//! Markdown generator: one architecture overview document.

use std::fmt::Write as _;

use archmap_core::model::ArchitectureModel;

use crate::{Generator, RenderError, RenderedFile};

pub struct MarkdownGenerator;

impl Generator for MarkdownGenerator {
    fn id(&self) -> &'static str {
        "markdown"
    }

    fn display_name(&self) -> &'static str {
        "Markdown overview"
    }

    fn generate(&self, model: &ArchitectureModel) -> Result<Vec<RenderedFile>, RenderError> {
        let mut out = String::new();
        let _ = writeln!(out, "# {} — Architecture", model.project_name);
        if !model.project_version.is_empty() {
            let _ = writeln!(out, "\nVersion: {}", model.project_version);
        }

        if !model.components.is_empty() {
            let _ = writeln!(out, "\n## Components\n");
            let _ = writeln!(out, "| Name | Type | Technology | Source |");
            let _ = writeln!(out, "|---|---|---|---|");
            for component in &model.components {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    component.name,
                    component.component_type.name(),
                    component.technology,
                    component.source_location.as_deref().unwrap_or("—"),
                );
            }
        }

        if !model.dependencies.is_empty() {
            let _ = writeln!(out, "\n## Dependencies\n");
            let _ = writeln!(out, "| Group | Artifact | Version | Scope |");
            let _ = writeln!(out, "|---|---|---|---|");
            for dependency in &model.dependencies {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    dependency.group_id,
                    dependency.artifact_id,
                    dependency.version,
                    dependency.scope.name(),
                );
            }
        }

        if !model.endpoints.is_empty() {
            let _ = writeln!(out, "\n## API Endpoints\n");
            let _ = writeln!(out, "| Method | Path | Handler | Confidence |");
            let _ = writeln!(out, "|---|---|---|---|");
            for endpoint in &model.endpoints {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    endpoint.method,
                    endpoint.path,
                    endpoint.handler.as_deref().unwrap_or("—"),
                    endpoint.confidence.name(),
                );
            }
        }

        if !model.entities.is_empty() {
            let _ = writeln!(out, "\n## Data Entities\n");
            for entity in &model.entities {
                let _ = writeln!(out, "### {} ({})\n", entity.name, entity.entity_kind);
                if let Some(pk) = &entity.primary_key {
                    let _ = writeln!(out, "Primary key: `{pk}`\n");
                }
                if !entity.fields.is_empty() {
                    let _ = writeln!(out, "| Field | Type | Nullable |");
                    let _ = writeln!(out, "|---|---|---|");
                    for field in &entity.fields {
                        let _ = writeln!(
                            out,
                            "| {} | {} | {} |",
                            field.name,
                            field.field_type,
                            if field.nullable { "yes" } else { "no" },
                        );
                    }
                    let _ = writeln!(out);
                }
            }
        }

        if !model.flows.is_empty() {
            let _ = writeln!(out, "\n## Message Flows\n");
            let _ = writeln!(out, "| Topic | Message | Broker | Publisher | Subscriber |");
            let _ = writeln!(out, "|---|---|---|---|---|");
            for flow in &model.flows {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    flow.topic,
                    flow.message_type,
                    flow.broker,
                    flow.publisher_component_id.as_deref().unwrap_or("—"),
                    flow.subscriber_component_id.as_deref().unwrap_or("—"),
                );
            }
        }

        let _ = writeln!(out, "\n## Scan Quality\n");
        let histogram = &model.quality.confidence;
        let _ = writeln!(
            out,
            "Findings: {} (high: {}, medium: {}, low: {})",
            histogram.total(),
            histogram.high,
            histogram.medium,
            histogram.low,
        );
        for (analyzer, rate) in &model.quality.success_rates {
            let _ = writeln!(out, "- `{analyzer}`: {:.0}% parse success", rate * 100.0);
        }

        Ok(vec![RenderedFile {
            relative_path: "architecture.md".to_string(),
            content: out,
        }])
    }
}

#[cfg(test)]
mod tests {
    use archmap_core::model::{Component, ComponentType};

    use super::*;

    #[test]
    fn renders_component_table() {
        let mut model = ArchitectureModel::new("shop", "1.0");
        model
            .components
            .push(Component::new("backend", ComponentType::Service).with_technology("maven"));
        let files = MarkdownGenerator.generate(&model).unwrap();
        assert_eq!(files[0].relative_path, "architecture.md");
        assert!(files[0].content.contains("# shop — Architecture"));
        assert!(files[0].content.contains("| backend | SERVICE | maven |"));
    }
}
