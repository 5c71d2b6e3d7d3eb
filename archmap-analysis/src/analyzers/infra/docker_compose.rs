//! docker-compose analyzer: services typed by image, `depends_on` →
//! relationships.

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{Component, ComponentType, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use serde_yaml::Value;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct DockerComposeAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(DockerComposeAnalyzer {
        kernel: AnalyzerKernel::new("docker-compose", services),
    }))
}

impl Analyzer for DockerComposeAnalyzer {
    fn id(&self) -> &'static str {
        "docker-compose"
    }

    fn display_name(&self) -> &'static str {
        "docker-compose services"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["docker"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec![
            "docker-compose.yml".into(),
            "docker-compose.yaml".into(),
            "compose.yml".into(),
            "compose.yaml".into(),
            "**/docker-compose.yml".into(),
            "**/docker-compose.yaml".into(),
        ]
    }

    fn priority(&self) -> i32 {
        priority::INFRA
    }

    fn strategy(&self) -> Strategy {
        has_files([
            "docker-compose.yml",
            "docker-compose.yaml",
            "compose.yml",
            "compose.yaml",
            "**/docker-compose.yml",
            "**/docker-compose.yaml",
        ])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&[
            "docker-compose.yml",
            "docker-compose.yaml",
            "compose.yml",
            "compose.yaml",
        ]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_compose(file, text),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

/// Known infrastructure images and the component type they imply.
const IMAGE_TYPES: &[(&str, ComponentType)] = &[
    ("postgres", ComponentType::Database),
    ("mysql", ComponentType::Database),
    ("mariadb", ComponentType::Database),
    ("mongo", ComponentType::Database),
    ("cassandra", ComponentType::Database),
    ("kafka", ComponentType::Queue),
    ("rabbitmq", ComponentType::Queue),
    ("activemq", ComponentType::Queue),
    ("nats", ComponentType::Queue),
    ("redis", ComponentType::Cache),
    ("memcached", ComponentType::Cache),
    ("nginx", ComponentType::Gateway),
    ("traefik", ComponentType::Gateway),
];

fn parse_compose(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let doc: Value = serde_yaml::from_str(text).map_err(|e| ParseError::Malformed {
        path: file.path.clone(),
        message: e.to_string(),
    })?;

    let Some(services) = doc.get("services").and_then(Value::as_mapping) else {
        return Err(ParseError::Unsupported {
            path: file.path.clone(),
            message: "no services section".to_string(),
        });
    };

    let mut findings = Findings::new();
    for (name, service) in services {
        let Some(name) = name.as_str() else { continue };
        let image = service
            .get("image")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let component_type = IMAGE_TYPES
            .iter()
            .find(|(needle, _)| image_base(image).contains(needle))
            .map(|(_, t)| *t)
            .unwrap_or(ComponentType::Service);

        let mut component = Component::new(name, component_type)
            .with_technology(image_base(image))
            .with_source_location(file.relative.clone());
        if !image.is_empty() {
            component
                .metadata
                .insert("image".to_string(), image.to_string());
        }
        findings.components.push(component);

        for target in depends_on_targets(service) {
            findings.relationships.push(
                Relationship::new(id_for(name), id_for(&target), RelationshipKind::DependsOn)
                    .with_description("depends_on")
                    .with_source_analyzer("docker-compose"),
            );
        }
    }
    Ok(findings)
}

/// `postgres:16-alpine` → `postgres`; registry prefixes are dropped.
fn image_base(image: &str) -> &str {
    let without_tag = image.split(':').next().unwrap_or(image);
    without_tag.rsplit('/').next().unwrap_or(without_tag)
}

/// `depends_on` supports both list and map forms.
fn depends_on_targets(service: &Value) -> Vec<String> {
    match service.get("depends_on") {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::Mapping(map)) => map
            .keys()
            .filter_map(|k| k.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn services_typed_by_image() {
        let text = r#"
services:
  api:
    build: .
    depends_on:
      - db
      - cache
  db:
    image: postgres:16-alpine
  cache:
    image: redis:7
  broker:
    image: confluentinc/cp-kafka:7.5.0
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/docker-compose.yml"),
            relative: "docker-compose.yml".to_string(),
            size_bytes: 1,
        };
        let findings = parse_compose(&file, text).unwrap();

        let type_of = |name: &str| {
            findings
                .components
                .iter()
                .find(|c| c.name == name)
                .unwrap()
                .component_type
        };
        assert_eq!(type_of("api"), ComponentType::Service);
        assert_eq!(type_of("db"), ComponentType::Database);
        assert_eq!(type_of("cache"), ComponentType::Cache);
        assert_eq!(type_of("broker"), ComponentType::Queue);

        assert_eq!(findings.relationships.len(), 2);
        assert_eq!(findings.relationships[0].source_id, id_for("api"));
    }
}
