//! Avro schema analyzer: `.avsc` JSON shape walker.

use archmap_core::errors::ParseError;
use archmap_core::model::{DataEntity, EntityField};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use serde_json::Value;

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct AvroAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(AvroAnalyzer {
        kernel: AnalyzerKernel::new("avro-schema", services),
    }))
}

impl Analyzer for AvroAnalyzer {
    fn id(&self) -> &'static str {
        "avro-schema"
    }

    fn display_name(&self) -> &'static str {
        "Avro schemas"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["avro"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.avsc".into(), "*.avsc".into()]
    }

    fn priority(&self) -> i32 {
        priority::SCHEMA
    }

    fn strategy(&self) -> Strategy {
        has_files(["**/*.avsc", "*.avsc"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["*.avsc"]);
        let kernel = super::schema_kernel(&self.kernel, ctx);
        let timed_out = kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_avro(&component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn parse_avro(
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::Malformed {
        path: file.path.clone(),
        message: e.to_string(),
    })?;

    let mut findings = Findings::new();
    walk_schema(component_id, &value, &mut findings);

    if findings.entities.is_empty() {
        return Err(ParseError::Unsupported {
            path: file.path.clone(),
            message: "no record definitions".to_string(),
        });
    }
    Ok(findings)
}

/// Record definitions may nest (a field's type can itself be a record),
/// so walk the whole JSON value and emit every record found.
fn walk_schema(component_id: &str, value: &Value, findings: &mut Findings) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("record") {
                if let Some(name) = map.get("name").and_then(Value::as_str) {
                    let mut entity = DataEntity::new(component_id, name, "avro-record");
                    if let Some(doc) = map.get("doc").and_then(Value::as_str) {
                        entity.description = Some(doc.to_string());
                    }
                    if let Some(namespace) = map.get("namespace").and_then(Value::as_str) {
                        entity = entity.with_table_name(format!("{namespace}.{name}"));
                    }
                    if let Some(fields) = map.get("fields").and_then(Value::as_array) {
                        for field in fields {
                            if let Some(entity_field) = avro_field(field) {
                                entity.fields.push(entity_field);
                            }
                        }
                    }
                    findings.entities.push(entity);
                }
            }
            for child in map.values() {
                walk_schema(component_id, child, findings);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_schema(component_id, item, findings);
            }
        }
        _ => {}
    }
}

fn avro_field(field: &Value) -> Option<EntityField> {
    let name = field.get("name")?.as_str()?.to_string();
    let field_type = field.get("type")?;
    let (type_name, nullable) = describe_type(field_type);
    Some(EntityField {
        name,
        field_type: type_name,
        nullable,
        default_value: field.get("default").map(|d| d.to_string()),
    })
}

/// Union with "null" means nullable; the shown type is the first
/// non-null branch.
fn describe_type(field_type: &Value) -> (String, bool) {
    match field_type {
        Value::String(name) => (name.clone(), false),
        Value::Array(branches) => {
            let nullable = branches
                .iter()
                .any(|b| b.as_str() == Some("null"));
            let shown = branches
                .iter()
                .find(|b| b.as_str() != Some("null"))
                .map(|b| describe_type(b).0)
                .unwrap_or_else(|| "null".to_string());
            (shown, nullable)
        }
        Value::Object(map) => {
            let base = map
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("complex");
            match base {
                "record" => (
                    map.get("name")
                        .and_then(Value::as_str)
                        .unwrap_or("record")
                        .to_string(),
                    false,
                ),
                "array" => {
                    let items = map.get("items").map(|i| describe_type(i).0);
                    (format!("array<{}>", items.unwrap_or_default()), false)
                }
                "map" => ("map".to_string(), false),
                other => (other.to_string(), false),
            }
        }
        _ => ("unknown".to_string(), false),
    }
}
