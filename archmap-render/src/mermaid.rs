//! Mermaid generator: component/relationship diagram plus a message
//! flow diagram.

use std::fmt::Write as _;

use archmap_core::model::ArchitectureModel;

use crate::{Generator, RenderError, RenderedFile};

pub struct MermaidGenerator;

impl Generator for MermaidGenerator {
    fn id(&self) -> &'static str {
        "mermaid"
    }

    fn display_name(&self) -> &'static str {
        "Mermaid diagrams"
    }

    fn generate(&self, model: &ArchitectureModel) -> Result<Vec<RenderedFile>, RenderError> {
        let mut out = String::new();
        let _ = writeln!(out, "# {} — Diagrams\n", model.project_name);

        let _ = writeln!(out, "## Components\n");
        let _ = writeln!(out, "```mermaid");
        let _ = writeln!(out, "graph TD");
        for component in &model.components {
            let _ = writeln!(
                out,
                "    {}[\"{} ({})\"]",
                node_id(&component.id),
                component.name,
                component.component_type.name(),
            );
        }
        for relationship in &model.relationships {
            let label = if relationship.description.is_empty() {
                relationship.kind.name().to_string()
            } else {
                relationship.description.clone()
            };
            let _ = writeln!(
                out,
                "    {} -->|{}| {}",
                node_id(&relationship.source_id),
                label,
                node_id(&relationship.target_id),
            );
        }
        let _ = writeln!(out, "```");

        if !model.flows.is_empty() {
            let _ = writeln!(out, "\n## Message Flows\n");
            let _ = writeln!(out, "```mermaid");
            let _ = writeln!(out, "graph LR");
            for (i, flow) in model.flows.iter().enumerate() {
                let topic_node = format!("t{i}");
                let _ = writeln!(out, "    {topic_node}([\"{}\"])", flow.topic);
                if let Some(publisher) = &flow.publisher_component_id {
                    let _ = writeln!(
                        out,
                        "    {} -->|{}| {topic_node}",
                        node_id(publisher),
                        flow.message_type,
                    );
                }
                if let Some(subscriber) = &flow.subscriber_component_id {
                    let _ = writeln!(
                        out,
                        "    {topic_node} -->|{}| {}",
                        flow.message_type,
                        node_id(subscriber),
                    );
                }
            }
            let _ = writeln!(out, "```");
        }

        Ok(vec![RenderedFile {
            relative_path: "diagrams.md".to_string(),
            content: out,
        }])
    }
}

/// Mermaid node ids must be alphanumeric; ids are hex or kebab names.
fn node_id(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("n{cleaned}")
}

#[cfg(test)]
mod tests {
    use archmap_core::model::{Component, ComponentType, Relationship, RelationshipKind};

    use super::*;

    #[test]
    fn renders_graph_with_edges() {
        let mut model = ArchitectureModel::new("shop", "1.0");
        let a = Component::new("api", ComponentType::Service);
        let b = Component::new("db", ComponentType::Database);
        model.relationships.push(
            Relationship::new(a.id.clone(), b.id.clone(), RelationshipKind::DependsOn)
                .with_description("reads"),
        );
        model.components.push(a);
        model.components.push(b);

        let files = MermaidGenerator.generate(&model).unwrap();
        let content = &files[0].content;
        assert!(content.contains("graph TD"));
        assert!(content.contains("-->|reads|"));
    }
}
