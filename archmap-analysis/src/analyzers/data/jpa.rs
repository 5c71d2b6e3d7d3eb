//! JPA entity analyzer: `@Entity` classes → DataEntities, association
//! annotations → Relationships.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{DataEntity, EntityField, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::data::collection_element;
use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_java, Strategy};

pub struct JpaAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(JpaAnalyzer {
        kernel: AnalyzerKernel::new("jpa-entities", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for JpaAnalyzer {
    fn id(&self) -> &'static str {
        "jpa-entities"
    }

    fn display_name(&self) -> &'static str {
        "JPA entities"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.java".into(), "*.java".into()]
    }

    fn priority(&self) -> i32 {
        priority::DATA
    }

    fn strategy(&self) -> Strategy {
        has_java()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_markers(&["@Entity", "javax.persistence", "jakarta.persistence"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_entities(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

const ASSOCIATIONS: &[(&str, &str)] = &[
    ("OneToMany", "One-to-Many"),
    ("ManyToOne", "Many-to-One"),
    ("OneToOne", "One-to-One"),
    ("ManyToMany", "Many-to-Many"),
];

fn extract_entities(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let unit = parsers.parse(text, &file.path, Language::Java)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();
    for class in &unit.classes {
        if !class.annotations.iter().any(|a| a.name == "Entity") {
            continue;
        }

        let table = class
            .annotations
            .iter()
            .find(|a| a.name == "Table")
            .and_then(|a| a.named_arg("name"))
            .map(String::from);
        let entity_name = table.clone().unwrap_or_else(|| class.name.clone());

        let mut entity = DataEntity::new(component_id, &entity_name, "jpa-entity")
            .with_table_name(table.unwrap_or_else(|| class.name.clone()));
        entity.description = Some(class.name.clone());

        for field in &class.fields {
            let field_type = field.field_type.clone().unwrap_or_default();
            let nullable = !field.annotations.iter().any(|a| {
                a.name == "Id" || a.named_arg("nullable").is_some_and(|v| v == "false")
            });
            entity.fields.push(EntityField {
                name: field.name.clone(),
                field_type: field_type.clone(),
                nullable,
                default_value: None,
            });

            if field.annotations.iter().any(|a| a.name == "Id") {
                entity.primary_key = Some(field.name.clone());
            }

            // Association annotations become relationship edges keyed by
            // class name: collections are one-to-many, scalar references
            // many-to-one.
            for annotation in &field.annotations {
                let Some((_, label)) = ASSOCIATIONS
                    .iter()
                    .find(|(name, _)| annotation.name == *name)
                else {
                    continue;
                };
                let target = collection_element(&field_type)
                    .unwrap_or_else(|| super::simple_type_name(&field_type));
                if target.is_empty() {
                    continue;
                }
                findings.relationships.push(
                    Relationship::new(
                        id_for(&class.name),
                        id_for(&target),
                        RelationshipKind::DependsOn,
                    )
                    .with_description(*label)
                    .with_source_analyzer("jpa-entities"),
                );
            }
        }

        findings.entities.push(entity);
    }
    Ok(findings)
}
