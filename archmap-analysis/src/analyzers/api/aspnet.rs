//! ASP.NET Core analyzer: attribute-routed controllers and Minimal API
//! `MapGet`/`MapPost` calls.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::api::join_paths;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::api::unwrap_response_type;
use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::{ClassDecl, ParserManager};
use crate::scanner::language::Language;
use crate::strategies::{has_csharp, Strategy};

pub struct AspNetAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(AspNetAnalyzer {
        kernel: AnalyzerKernel::new("aspnet-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for AspNetAnalyzer {
    fn id(&self) -> &'static str {
        "aspnet-rest"
    }

    fn display_name(&self) -> &'static str {
        "ASP.NET Core endpoints"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["csharp"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.cs".into(), "*.cs".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_csharp()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_name_patterns(&["*Controller.cs", "Program.cs"])
            .with_markers(&["[ApiController]", "ControllerBase", "MapGet", "MapPost"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_endpoints(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

const HTTP_ATTRIBUTES: &[(&str, &str)] = &[
    ("HttpGet", "GET"),
    ("HttpPost", "POST"),
    ("HttpPut", "PUT"),
    ("HttpDelete", "DELETE"),
    ("HttpPatch", "PATCH"),
];

const MAP_METHODS: &[(&str, &str)] = &[
    ("MapGet", "GET"),
    ("MapPost", "POST"),
    ("MapPut", "PUT"),
    ("MapDelete", "DELETE"),
    ("MapPatch", "PATCH"),
];

fn extract_endpoints(
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

    let mut findings = Findings::new();

    for class in &unit.classes {
        if !is_controller(class) {
            continue;
        }
        let base = class
            .annotations
            .iter()
            .find(|a| a.name == "Route")
            .and_then(|a| a.first_positional())
            .map(|template| resolve_route_tokens(template, &class.name))
            .unwrap_or_default();

        for method in &class.methods {
            for annotation in &method.annotations {
                let Some((_, verb)) = HTTP_ATTRIBUTES
                    .iter()
                    .find(|(name, _)| annotation.name == *name)
                else {
                    continue;
                };
                let sub = annotation.first_positional().unwrap_or("");
                let mut endpoint = ApiEndpoint::new(
                    component_id,
                    ApiKind::Rest,
                    *verb,
                    join_paths(&base, sub),
                )
                .with_handler(format!("{}.{}", class.name, method.name));

                for param in &method.params {
                    let param_type = param.type_annotation.clone().unwrap_or_default();
                    for attr in &param.annotations {
                        let label = match attr.name.as_str() {
                            "FromRoute" => Some(format!("Route:{}", param.name)),
                            "FromQuery" => Some(format!("Query:{}", param.name)),
                            "FromHeader" => Some(format!("Header:{}", param.name)),
                            "FromBody" => {
                                endpoint.request_schema = Some(param_type.clone());
                                Some(format!("Body:{param_type}"))
                            }
                            _ => None,
                        };
                        if let Some(label) = label {
                            endpoint.parameters.push(label);
                        }
                    }
                }
                endpoint.response_schema = method
                    .return_type
                    .as_deref()
                    .and_then(unwrap_response_type);
                findings.endpoints.push(endpoint);
            }
        }
    }

    // Minimal APIs: app.MapGet("/users", handler)
    for call in &unit.calls {
        let Some((_, verb)) = MAP_METHODS.iter().find(|(name, _)| call.name == *name) else {
            continue;
        };
        if let Some(route) = call.first_string_arg() {
            findings.endpoints.push(ApiEndpoint::new(
                component_id,
                ApiKind::Rest,
                *verb,
                route.to_string(),
            ));
        }
    }

    Ok(findings)
}

fn is_controller(class: &ClassDecl) -> bool {
    class.annotations.iter().any(|a| a.name == "ApiController")
        || class.extends.as_deref() == Some("ControllerBase")
        || class.extends.as_deref() == Some("Controller")
}

/// `[Route("api/[controller]")]` on `ProductsController` → `api/products`.
fn resolve_route_tokens(template: &str, class_name: &str) -> String {
    let controller = class_name
        .strip_suffix("Controller")
        .unwrap_or(class_name)
        .to_lowercase();
    template.replace("[controller]", &controller)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn attribute_routed_controller() {
        let source = r#"
using Microsoft.AspNetCore.Mvc;

[ApiController]
[Route("api/[controller]")]
public class ProductsController : ControllerBase {
    [HttpGet]
    public ActionResult<List<Product>> List() { return null; }

    [HttpGet("{id}")]
    public ActionResult<Product> Get([FromRoute] int id) { return null; }

    [HttpPost]
    public Product Create([FromBody] CreateProduct input) { return null; }
}
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/ProductsController.cs"),
            relative: "Api/ProductsController.cs".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_endpoints(&parsers, "c", &file, source).unwrap();
        let routes: Vec<_> = findings
            .endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("GET", "/api/products"),
                ("GET", "/api/products/{id}"),
                ("POST", "/api/products"),
            ]
        );
        assert_eq!(
            findings.endpoints[2].request_schema.as_deref(),
            Some("CreateProduct")
        );
    }

    #[test]
    fn minimal_api_map_calls() {
        let source = r#"
var app = builder.Build();
app.MapGet("/health", () => "ok");
app.MapPost("/orders", CreateOrder);
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/Program.cs"),
            relative: "Program.cs".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_endpoints(&parsers, "c", &file, source).unwrap();
        let routes: Vec<_> = findings.endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(routes, vec!["/health", "/orders"]);
    }
}
