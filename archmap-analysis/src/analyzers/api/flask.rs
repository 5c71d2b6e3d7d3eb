//! Flask analyzer: `@app.route("/path", methods=[...])` and blueprint
//! routes.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct FlaskAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(FlaskAnalyzer {
        kernel: AnalyzerKernel::new("flask-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for FlaskAnalyzer {
    fn id(&self) -> &'static str {
        "flask-rest"
    }

    fn display_name(&self) -> &'static str {
        "Flask endpoints"
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
        let prefilter = PreFilter::new().with_markers(&["flask", "Blueprint"]);
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
    for function in &unit.functions {
        let Some(annotation) = function
            .annotations
            .iter()
            .find(|a| a.simple_name() == "route" && a.receiver().is_some())
        else {
            continue;
        };
        let Some(path) = annotation.first_positional() else {
            continue;
        };

        // methods=["GET", "POST"]; GET when absent.
        let methods: Vec<String> = annotation
            .named_arg("methods")
            .map(|raw| {
                raw.trim_matches(|c| c == '[' || c == ']')
                    .split(',')
                    .map(|m| m.trim().trim_matches(|c| c == '"' || c == '\'').to_uppercase())
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["GET".to_string()]);

        for method in methods {
            findings.endpoints.push(
                ApiEndpoint::new(component_id, ApiKind::Rest, method, path)
                    .with_handler(function.name.clone()),
            );
        }
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn route_methods_expand_to_endpoints() {
        let source = r#"
from flask import Flask

app = Flask(__name__)

@app.route("/health")
def health():
    return "ok"

@app.route("/users", methods=["GET", "POST"])
def users():
    return []
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/app.py"),
            relative: "app.py".to_string(),
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
            vec![("GET", "/health"), ("GET", "/users"), ("POST", "/users")]
        );
    }
}
