//! JAX-RS REST analyzer: `@Path` resources with `@GET`/`@POST`/… verbs.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::api::join_paths;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::api::unwrap_response_type;
use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_java, Strategy};

pub struct JaxRsAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(JaxRsAnalyzer {
        kernel: AnalyzerKernel::new("jaxrs-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for JaxRsAnalyzer {
    fn id(&self) -> &'static str {
        "jaxrs-rest"
    }

    fn display_name(&self) -> &'static str {
        "JAX-RS REST endpoints"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.java".into(), "*.java".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_java()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_name_patterns(&["*Resource.java", "*Endpoint.java"])
            .with_markers(&["javax.ws.rs", "jakarta.ws.rs"]);
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

const VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

fn extract_endpoints(
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
        let Some(base) = class
            .annotations
            .iter()
            .find(|a| a.name == "Path")
            .and_then(|a| a.first_positional())
        else {
            continue;
        };

        for method in &class.methods {
            let verb = method
                .annotations
                .iter()
                .find_map(|a| VERBS.contains(&a.name.as_str()).then(|| a.name.clone()));
            let Some(verb) = verb else { continue };

            let sub = method
                .annotations
                .iter()
                .find(|a| a.name == "Path")
                .and_then(|a| a.first_positional())
                .unwrap_or("");

            let mut endpoint = ApiEndpoint::new(
                component_id,
                ApiKind::Rest,
                verb,
                join_paths(base, sub),
            )
            .with_handler(format!("{}.{}", class.name, method.name));

            for param in &method.params {
                for annotation in &param.annotations {
                    let label = match annotation.name.as_str() {
                        "PathParam" => Some(format!("Route:{}", param.name)),
                        "QueryParam" => Some(format!("Query:{}", param.name)),
                        "HeaderParam" => Some(format!("Header:{}", param.name)),
                        _ => None,
                    };
                    if let Some(label) = label {
                        endpoint.parameters.push(label);
                    }
                }
                // The unannotated entity parameter is the request body.
                if param.annotations.is_empty() {
                    if let Some(t) = &param.type_annotation {
                        endpoint.request_schema = Some(t.clone());
                    }
                }
            }
            endpoint.response_schema = method
                .return_type
                .as_deref()
                .and_then(unwrap_response_type)
                .filter(|t| t != "Response");

            findings.endpoints.push(endpoint);
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn jaxrs_resource_paths_and_verbs() {
        let source = r#"
import jakarta.ws.rs.*;

@Path("/orders")
public class OrderResource {
    @GET
    public List<Order> list() { return null; }

    @GET
    @Path("/{id}")
    public Order get(@PathParam("id") String id) { return null; }

    @POST
    public Response create(CreateOrder order) { return null; }
}
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/OrderResource.java"),
            relative: "src/OrderResource.java".to_string(),
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
            vec![("GET", "/orders"), ("GET", "/orders/{id}"), ("POST", "/orders")]
        );
        assert_eq!(findings.endpoints[1].parameters, vec!["Route:id".to_string()]);
        assert_eq!(findings.endpoints[2].request_schema.as_deref(), Some("CreateOrder"));
    }
}
