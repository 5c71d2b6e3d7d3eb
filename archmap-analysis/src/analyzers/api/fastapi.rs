//! FastAPI analyzer: `@app.get("/path")` / `@router.post(...)`
//! decorated functions.

use std::sync::{Arc, OnceLock};

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::{FunctionDecl, ParserManager};
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct FastApiAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(FastApiAnalyzer {
        kernel: AnalyzerKernel::new("fastapi-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for FastApiAnalyzer {
    fn id(&self) -> &'static str {
        "fastapi-rest"
    }

    fn display_name(&self) -> &'static str {
        "FastAPI endpoints"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.py".into(), "*.py".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_python()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_markers(&["fastapi", "APIRouter"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_endpoints(&parsers, &component_id, file, text),
            Some(&|file, text| fallback_endpoints(&component_id, file, text)),
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

const HTTP_METHODS: &[&str] = &["get", "post", "put", "delete", "patch", "head", "options"];

fn extract_endpoints(
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
    let functions = unit
        .functions
        .iter()
        .chain(unit.classes.iter().flat_map(|c| c.methods.iter()));
    for function in functions {
        if let Some(endpoint) = endpoint_for_function(component_id, function) {
            findings.endpoints.push(endpoint);
        }
    }
    Ok(findings)
}

fn endpoint_for_function(component_id: &str, function: &FunctionDecl) -> Option<ApiEndpoint> {
    let annotation = function.annotations.iter().find(|a| {
        HTTP_METHODS.contains(&a.simple_name()) && a.receiver().is_some()
    })?;
    let path = annotation.first_positional()?;

    let mut endpoint = ApiEndpoint::new(
        component_id,
        ApiKind::Rest,
        annotation.simple_name().to_uppercase(),
        path,
    )
    .with_handler(function.name.clone());

    if let Some(model) = annotation.named_arg("response_model") {
        endpoint.response_schema = Some(model.to_string());
    }

    for param in &function.params {
        let Some(type_annotation) = &param.type_annotation else {
            continue;
        };
        let type_annotation = type_annotation.trim_start_matches(':').trim();
        if is_model_type(type_annotation) {
            endpoint.request_schema = Some(type_annotation.to_string());
            endpoint.parameters.push(format!("Body:{type_annotation}"));
        } else if endpoint.path.contains(&format!("{{{}}}", param.name)) {
            endpoint.parameters.push(format!("Route:{}", param.name));
        } else {
            endpoint.parameters.push(format!("Query:{}", param.name));
        }
    }

    Some(endpoint)
}

/// Pydantic-style model types are capitalized and not builtin scalars.
fn is_model_type(type_annotation: &str) -> bool {
    let base = type_annotation
        .split(&['[', '|'][..])
        .next()
        .unwrap_or("")
        .trim();
    !base.is_empty()
        && base.chars().next().is_some_and(char::is_uppercase)
        && !matches!(base, "Optional" | "List" | "Dict" | "Union" | "Annotated" | "Request" | "Response")
}

/// Tier 2: decorator lines matched textually.
fn fallback_endpoints(component_id: &str, _file: &DiscoveredFile, text: &str) -> Findings {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"@\w+\.(get|post|put|delete|patch)\(\s*["']([^"']+)["']"#)
            .expect("static regex")
    });

    let mut findings = Findings::new();
    for capture in re.captures_iter(text) {
        findings.endpoints.push(ApiEndpoint::new(
            component_id,
            ApiKind::Rest,
            capture[1].to_uppercase(),
            capture[2].to_string(),
        ));
    }
    findings
}
