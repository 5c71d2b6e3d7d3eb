//! Django ORM analyzer: `models.Model` subclasses with field
//! declarations.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::component_id as id_for;
use archmap_core::model::{DataEntity, EntityField, Relationship, RelationshipKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct DjangoOrmAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(DjangoOrmAnalyzer {
        kernel: AnalyzerKernel::new("django-entities", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for DjangoOrmAnalyzer {
    fn id(&self) -> &'static str {
        "django-entities"
    }

    fn display_name(&self) -> &'static str {
        "Django ORM entities"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/models.py".into(), "**/models/*.py".into(), "models.py".into()]
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
        let prefilter = PreFilter::new()
            .with_name_patterns(&["models.py"])
            .with_markers(&["models.Model", "django.db"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_models(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn extract_models(
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
        let is_model = class
            .extends
            .as_deref()
            .is_some_and(|base| base == "models.Model" || base.ends_with(".Model"));
        if !is_model {
            continue;
        }

        let mut entity = DataEntity::new(component_id, &class.name, "django-model");
        // Django generates an implicit integer primary key unless a
        // field declares primary_key=True.
        let mut explicit_pk = None;

        for field in &class.fields {
            let Some(call) = &field.initializer_call else {
                continue;
            };
            let field_kind = call.name.clone();
            if !field_kind.ends_with("Field")
                && !matches!(field_kind.as_str(), "ForeignKey" | "ManyToManyField" | "OneToOneField")
            {
                continue;
            }

            let nullable = call.named_arg("null").is_some_and(|v| v == "True");
            entity.fields.push(EntityField {
                name: field.name.clone(),
                field_type: field_kind.clone(),
                nullable,
                default_value: call.named_arg("default").map(String::from),
            });
            if call.named_arg("primary_key").is_some_and(|v| v == "True") {
                explicit_pk = Some(field.name.clone());
            }

            let relation = match field_kind.as_str() {
                "ForeignKey" | "OneToOneField" => Some("Many-to-One"),
                "ManyToManyField" => Some("Many-to-Many"),
                _ => None,
            };
            if let (Some(label), Some(target)) = (relation, call.first_string_arg()) {
                let target = target.rsplit('.').next().unwrap_or(target);
                findings.relationships.push(
                    Relationship::new(
                        id_for(&class.name),
                        id_for(target),
                        RelationshipKind::DependsOn,
                    )
                    .with_description(label)
                    .with_source_analyzer("django-entities"),
                );
            }
        }

        entity.primary_key = Some(explicit_pk.unwrap_or_else(|| "id".to_string()));
        findings.entities.push(entity);
    }
    Ok(findings)
}
