//! Spring MVC / Spring Boot REST analyzer.
//!
//! Class-level `@RequestMapping` paths concatenate with method-level
//! mapping annotations; parameter sources are labelled by their binding
//! annotation.

use std::sync::{Arc, OnceLock};

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::api::unwrap_response_type;
use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::{Annotation, ClassDecl, FunctionDecl, ParserManager};
use crate::scanner::language::Language;
use crate::strategies::{has_java, Strategy};

pub struct SpringAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(SpringAnalyzer {
        kernel: AnalyzerKernel::new("spring-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for SpringAnalyzer {
    fn id(&self) -> &'static str {
        "spring-rest"
    }

    fn display_name(&self) -> &'static str {
        "Spring REST endpoints"
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
            .with_name_patterns(&["*Controller.java", "*Resource.java", "*Endpoint.java"])
            .with_markers(&["@RestController", "@Controller", "@RequestMapping"]);
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

const METHOD_MAPPINGS: &[(&str, &str)] = &[
    ("GetMapping", "GET"),
    ("PostMapping", "POST"),
    ("PutMapping", "PUT"),
    ("DeleteMapping", "DELETE"),
    ("PatchMapping", "PATCH"),
];

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
        let is_controller = class
            .annotations
            .iter()
            .any(|a| a.name == "RestController" || a.name == "Controller");
        if !is_controller {
            continue;
        }
        let base_path = class
            .annotations
            .iter()
            .find(|a| a.name == "RequestMapping")
            .and_then(mapping_path)
            .unwrap_or_default();

        for method in &class.methods {
            for endpoint in endpoints_for_method(component_id, class, method, &base_path) {
                findings.endpoints.push(endpoint);
            }
        }
    }
    Ok(findings)
}

fn endpoints_for_method(
    component_id: &str,
    class: &ClassDecl,
    method: &FunctionDecl,
    base_path: &str,
) -> Vec<ApiEndpoint> {
    let mut endpoints = Vec::new();
    for annotation in &method.annotations {
        let verb = METHOD_MAPPINGS
            .iter()
            .find(|(name, _)| annotation.name == *name)
            .map(|(_, verb)| verb.to_string())
            .or_else(|| {
                (annotation.name == "RequestMapping")
                    .then(|| request_mapping_verb(annotation))
                    .flatten()
            });
        let Some(verb) = verb else { continue };

        let sub_path = mapping_path(annotation).unwrap_or_default();
        let full_path =
            archmap_core::model::api::join_paths(base_path, &sub_path);

        let mut endpoint = ApiEndpoint::new(component_id, ApiKind::Rest, verb, full_path)
            .with_handler(format!("{}.{}", class.name, method.name));

        for param in &method.params {
            let param_type = param.type_annotation.clone().unwrap_or_default();
            for param_annotation in &param.annotations {
                let label = match param_annotation.name.as_str() {
                    "PathVariable" => Some(format!("Route:{}", param.name)),
                    "RequestParam" => Some(format!("Query:{}", param.name)),
                    "RequestHeader" => Some(format!("Header:{}", param.name)),
                    "RequestBody" => {
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

        endpoints.push(endpoint);
    }
    endpoints
}

/// Path from `@GetMapping("/x")`, `@RequestMapping(value = "/x")`, or
/// `@RequestMapping(path = "/x")`.
fn mapping_path(annotation: &Annotation) -> Option<String> {
    let raw = annotation
        .first_positional()
        .or_else(|| annotation.named_arg("value"))
        .or_else(|| annotation.named_arg("path"))?;
    // Array form `{"/a", "/b"}` keeps only the first element; a bare
    // template like `{id}` carries no quotes and passes through.
    let raw = raw.trim();
    let value = match raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        Some(inner) if inner.contains('"') => inner.split(',').next().unwrap_or("").trim(),
        _ => raw,
    };
    let value = value.trim_matches('"').to_string();
    (!value.is_empty()).then_some(value)
}

/// `@RequestMapping(method = RequestMethod.GET)`.
fn request_mapping_verb(annotation: &Annotation) -> Option<String> {
    let method = annotation.named_arg("method")?;
    method
        .rsplit('.')
        .next()
        .map(|verb| verb.trim().to_uppercase())
}

/// Tier 2: mapping annotations matched directly in the text. Class-level
/// prefixes cannot be reconstructed reliably here, so paths are emitted
/// as written.
fn fallback_endpoints(component_id: &str, _file: &DiscoveredFile, text: &str) -> Findings {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"@(Get|Post|Put|Delete|Patch)Mapping\s*\(\s*"([^"]*)""#)
            .expect("static regex")
    });

    let mut findings = Findings::new();
    for capture in re.captures_iter(text) {
        let verb = capture[1].to_uppercase();
        findings.endpoints.push(ApiEndpoint::new(
            component_id,
            ApiKind::Rest,
            verb,
            capture[2].to_string(),
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file() -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from("/p/UserController.java"),
            relative: "src/main/java/UserController.java".to_string(),
            size_bytes: 1,
        }
    }

    const CONTROLLER: &str = r#"
import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/api/users")
public class UserController {
    @GetMapping
    public List<User> list() { return null; }

    @GetMapping("/{id}")
    public ResponseEntity<User> get(@PathVariable Long id) { return null; }

    @PostMapping
    public User create(@RequestBody CreateUserRequest request) { return null; }
}
"#;

    #[test]
    fn class_and_method_paths_concatenate() {
        let parsers = ParserManager::new();
        let findings = extract_endpoints(&parsers, "c", &file(), CONTROLLER).unwrap();
        let routes: Vec<_> = findings
            .endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("GET", "/api/users"),
                ("GET", "/api/users/{id}"),
                ("POST", "/api/users"),
            ]
        );
    }

    #[test]
    fn parameters_are_labelled_by_source() {
        let parsers = ParserManager::new();
        let findings = extract_endpoints(&parsers, "c", &file(), CONTROLLER).unwrap();
        assert_eq!(findings.endpoints[1].parameters, vec!["Route:id".to_string()]);
        assert_eq!(
            findings.endpoints[2].request_schema.as_deref(),
            Some("CreateUserRequest")
        );
        assert_eq!(
            findings.endpoints[2].parameters,
            vec!["Body:CreateUserRequest".to_string()]
        );
    }

    #[test]
    fn response_wrapper_is_unwrapped() {
        let parsers = ParserManager::new();
        let findings = extract_endpoints(&parsers, "c", &file(), CONTROLLER).unwrap();
        assert_eq!(findings.endpoints[1].response_schema.as_deref(), Some("User"));
    }

    #[test]
    fn non_controller_classes_emit_nothing() {
        let parsers = ParserManager::new();
        let source = "public class UserService { public void save() {} }";
        let findings = extract_endpoints(&parsers, "c", &file(), source).unwrap();
        assert!(findings.endpoints.is_empty());
    }

    #[test]
    fn fallback_reads_annotations_textually() {
        let broken = r#"@GetMapping("/api/legacy") public List<X> legacy( {"#;
        let findings = fallback_endpoints("c", &file(), broken);
        assert_eq!(findings.endpoints.len(), 1);
        assert_eq!(findings.endpoints[0].path, "/api/legacy");
    }
}
