//! SQLAlchemy entity analyzer: declarative classes with `Column(...)`
//! attributes.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{DataEntity, EntityField, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::{ClassDecl, ParserManager};
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct SqlAlchemyAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(SqlAlchemyAnalyzer {
        kernel: AnalyzerKernel::new("sqlalchemy-entities", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for SqlAlchemyAnalyzer {
    fn id(&self) -> &'static str {
        "sqlalchemy-entities"
    }

    fn display_name(&self) -> &'static str {
        "SQLAlchemy entities"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.py".into(), "*.py".into()]
    }

    fn priority(&self) -> i32 {
        priority::DATA
    }

    fn strategy(&self) -> Strategy {
        has_python()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_markers(&["sqlalchemy", "Column("]);
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
    let unit = parsers.parse(text, &file.path, Language::Python)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();
    for class in &unit.classes {
        if !is_declarative_model(class) {
            continue;
        }

        let table = class
            .fields
            .iter()
            .find(|f| f.name == "__tablename__")
            .and_then(|f| f.initializer_literal.clone());
        let entity_name = table.clone().unwrap_or_else(|| class.name.clone());

        let mut entity = DataEntity::new(component_id, &entity_name, "sqlalchemy-model");
        entity.description = Some(class.name.clone());
        if let Some(table) = table {
            entity = entity.with_table_name(table);
        }

        for field in &class.fields {
            let Some(call) = &field.initializer_call else {
                continue;
            };
            match call.name.as_str() {
                "Column" | "mapped_column" => {
                    let field_type = call
                        .first_string_arg()
                        .unwrap_or("Unknown")
                        .split('(')
                        .next()
                        .unwrap_or("Unknown")
                        .to_string();
                    let primary = call
                        .named_arg("primary_key")
                        .is_some_and(|v| v == "True");
                    let nullable = call
                        .named_arg("nullable")
                        .map(|v| v == "True")
                        .unwrap_or(!primary);
                    entity.fields.push(EntityField {
                        name: field.name.clone(),
                        field_type,
                        nullable,
                        default_value: call.named_arg("default").map(String::from),
                    });
                    if primary {
                        entity.primary_key = Some(field.name.clone());
                    }
                    // ForeignKey("orders.id") argument → many-to-one edge.
                    if let Some(target_table) = call
                        .args
                        .iter()
                        .find(|a| a.value.starts_with("ForeignKey"))
                        .and_then(|a| foreign_key_table(&a.value))
                    {
                        findings.relationships.push(
                            Relationship::new(
                                id_for(&class.name),
                                id_for(&target_table),
                                RelationshipKind::DependsOn,
                            )
                            .with_description("Many-to-One")
                            .with_source_analyzer("sqlalchemy-entities"),
                        );
                    }
                }
                "relationship" => {
                    if let Some(target) = call.first_string_arg() {
                        findings.relationships.push(
                            Relationship::new(
                                id_for(&class.name),
                                id_for(target),
                                RelationshipKind::DependsOn,
                            )
                            .with_description("One-to-Many")
                            .with_source_analyzer("sqlalchemy-entities"),
                        );
                    }
                }
                _ => {}
            }
        }

        findings.entities.push(entity);
    }
    Ok(findings)
}

/// Declarative models extend `Base` (or `db.Model` in Flask-SQLAlchemy).
fn is_declarative_model(class: &ClassDecl) -> bool {
    class.extends.as_deref().is_some_and(|base| {
        base == "Base" || base.ends_with(".Model") || base == "DeclarativeBase"
    }) || class.fields.iter().any(|f| f.name == "__tablename__")
}

/// `ForeignKey("orders.id")` → `orders`.
fn foreign_key_table(raw: &str) -> Option<String> {
    let start = raw.find(|c| c == '"' || c == '\'')?;
    let rest = &raw[start + 1..];
    let end = rest.find(|c| c == '"' || c == '\'')?;
    let reference = &rest[..end];
    Some(reference.split('.').next().unwrap_or(reference).to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn declarative_model_fields_and_pk() {
        let source = r#"
from sqlalchemy import Column, Integer, String, ForeignKey
from sqlalchemy.orm import relationship
from .base import Base

class User(Base):
    __tablename__ = "users"
    id = Column(Integer, primary_key=True)
    name = Column(String, nullable=False)
    orders = relationship("Order")

class Order(Base):
    __tablename__ = "orders"
    id = Column(Integer, primary_key=True)
    user_id = Column(Integer, ForeignKey("users.id"))
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/models.py"),
            relative: "app/models.py".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_entities(&parsers, "c", &file, source).unwrap();

        assert_eq!(findings.entities.len(), 2);
        let user = &findings.entities[0];
        assert_eq!(user.name, "users");
        assert_eq!(user.primary_key.as_deref(), Some("id"));
        let name_field = user.fields.iter().find(|f| f.name == "name").unwrap();
        assert!(!name_field.nullable);

        let kinds: Vec<_> = findings
            .relationships
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert!(kinds.contains(&"One-to-Many"));
        assert!(kinds.contains(&"Many-to-One"));
    }
}
