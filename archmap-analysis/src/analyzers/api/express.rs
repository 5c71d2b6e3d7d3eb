//! Express analyzer: `app.get("/path", handler)` / router call sites in
//! JS and TS sources.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_javascript, Strategy};

pub struct ExpressAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(ExpressAnalyzer {
        kernel: AnalyzerKernel::new("express-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for ExpressAnalyzer {
    fn id(&self) -> &'static str {
        "express-rest"
    }

    fn display_name(&self) -> &'static str {
        "Express endpoints"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["javascript", "typescript"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec![
            "**/*.js".into(),
            "**/*.mjs".into(),
            "**/*.ts".into(),
            "*.js".into(),
            "*.ts".into(),
        ]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_javascript()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_markers(&["express", "Router("]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_routes(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

const VERBS: &[&str] = &["get", "post", "put", "delete", "patch", "all"];
const RECEIVERS: &[&str] = &["app", "router", "server", "api"];

fn extract_routes(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let language = if file.relative.ends_with(".ts") || file.relative.ends_with(".tsx") {
        Language::TypeScript
    } else {
        Language::JavaScript
    };
    let unit = parsers.parse(text, &file.path, language)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();
    for call in &unit.calls {
        let Some(receiver) = call.receiver.as_deref() else {
            continue;
        };
        if !RECEIVERS.contains(&receiver) || !VERBS.contains(&call.name.as_str()) {
            continue;
        }
        let Some(route) = call.first_string_arg() else {
            continue;
        };
        if !route.starts_with('/') {
            continue;
        }
        let handler = call
            .args
            .iter()
            .filter(|a| a.name.is_none())
            .nth(1)
            .map(|a| a.value.clone())
            .filter(|h| !h.contains("=>") && !h.starts_with("function"));

        let mut endpoint = ApiEndpoint::new(
            component_id,
            ApiKind::Rest,
            call.name.to_uppercase(),
            route.to_string(),
        );
        if let Some(handler) = handler {
            endpoint = endpoint.with_handler(handler);
        }
        findings.endpoints.push(endpoint);
    }
    Ok(findings)
}
