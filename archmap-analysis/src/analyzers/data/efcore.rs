//! Entity Framework Core analyzer: `[Table]`/`[Key]` attributes, key
//! conventions, and navigation properties.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{DataEntity, EntityField, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::data::collection_element;
use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::{ClassDecl, ParserManager};
use crate::scanner::language::Language;
use crate::strategies::{has_csharp, Strategy};

pub struct EfCoreAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(EfCoreAnalyzer {
        kernel: AnalyzerKernel::new("efcore-entities", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for EfCoreAnalyzer {
    fn id(&self) -> &'static str {
        "efcore-entities"
    }

    fn display_name(&self) -> &'static str {
        "Entity Framework Core entities"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["csharp"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.cs".into(), "*.cs".into()]
    }

    fn priority(&self) -> i32 {
        priority::DATA
    }

    fn strategy(&self) -> Strategy {
        has_csharp()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_markers(&["[Table", "[Key]", "DbSet<", "EntityFrameworkCore"]);
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

fn extract_entities(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let unit = parsers.parse(text, &file.path, Language::CSharp)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    // Classes referenced from a DbSet<> are entities even without a
    // [Table] attribute.
    let mut dbset_entities: Vec<String> = Vec::new();
    for class in &unit.classes {
        for field in &class.fields {
            if let Some(inner) = field
                .field_type
                .as_deref()
                .and_then(|t| t.strip_prefix("DbSet<"))
            {
                dbset_entities.push(inner.trim_end_matches('>').to_string());
            }
        }
    }

    let mut findings = Findings::new();
    for class in &unit.classes {
        let table_attribute = class
            .annotations
            .iter()
            .find(|a| a.name == "Table")
            .and_then(|a| a.first_positional())
            .map(String::from);
        let is_entity = table_attribute.is_some() || dbset_entities.contains(&class.name);
        if !is_entity {
            continue;
        }

        let entity_name = table_attribute.clone().unwrap_or_else(|| class.name.clone());
        let mut entity = DataEntity::new(component_id, &entity_name, "efcore-entity");
        entity.description = Some(class.name.clone());
        if let Some(table) = table_attribute {
            entity = entity.with_table_name(table);
        }

        for field in &class.fields {
            let field_type = field.field_type.clone().unwrap_or_default();
            let nullable = field_type.ends_with('?');
            entity.fields.push(EntityField {
                name: field.name.clone(),
                field_type: field_type.clone(),
                nullable,
                default_value: None,
            });

            // Key detection: [Key], `Id`, or `{Class}Id`.
            let is_key = field.annotations.iter().any(|a| a.name == "Key")
                || field.name == "Id"
                || field.name == format!("{}Id", class.name);
            if is_key && entity.primary_key.is_none() {
                entity.primary_key = Some(field.name.clone());
            }

            // Collection navigation properties are one-to-many edges;
            // `{Other}Id` foreign-key properties are many-to-one.
            if let Some(target) = collection_element(&field_type) {
                findings.relationships.push(
                    Relationship::new(
                        id_for(&class.name),
                        id_for(&target),
                        RelationshipKind::DependsOn,
                    )
                    .with_description("One-to-Many")
                    .with_source_analyzer("efcore-entities"),
                );
            } else if let Some(target) = field
                .name
                .strip_suffix("Id")
                .filter(|t| !t.is_empty() && *t != class.name.as_str())
            {
                if class_exists(&unit.classes, target) {
                    findings.relationships.push(
                        Relationship::new(
                            id_for(&class.name),
                            id_for(target),
                            RelationshipKind::DependsOn,
                        )
                        .with_description("Many-to-One")
                        .with_source_analyzer("efcore-entities"),
                    );
                }
            }
        }

        findings.entities.push(entity);
    }
    Ok(findings)
}

fn class_exists(classes: &[ClassDecl], name: &str) -> bool {
    classes.iter().any(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn table_attribute_and_key_convention() {
        let source = r#"
using System.ComponentModel.DataAnnotations;
using System.ComponentModel.DataAnnotations.Schema;

[Table("orders")]
public class Order {
    [Key]
    public int OrderId { get; set; }
    public int CustomerId { get; set; }
    public List<OrderLine> Lines { get; set; }
}

[Table("customers")]
public class Customer {
    public int Id { get; set; }
    public string? Email { get; set; }
}

[Table("order_lines")]
public class OrderLine {
    public int Id { get; set; }
}
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/Entities.cs"),
            relative: "Data/Entities.cs".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_entities(&parsers, "c", &file, source).unwrap();

        assert_eq!(findings.entities.len(), 3);
        let order = &findings.entities[0];
        assert_eq!(order.name, "orders");
        assert_eq!(order.primary_key.as_deref(), Some("OrderId"));

        let customer = &findings.entities[1];
        assert_eq!(customer.primary_key.as_deref(), Some("Id"));
        assert!(customer.fields.iter().any(|f| f.nullable));

        let labels: Vec<_> = findings
            .relationships
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert!(labels.contains(&"Many-to-One"));
        assert!(labels.contains(&"One-to-Many"));
    }
}
