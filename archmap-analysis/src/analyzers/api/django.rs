//! Django URL analyzer: `urls.py` route tables.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct DjangoUrlAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(DjangoUrlAnalyzer {
        kernel: AnalyzerKernel::new("django-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for DjangoUrlAnalyzer {
    fn id(&self) -> &'static str {
        "django-rest"
    }

    fn display_name(&self) -> &'static str {
        "Django URL routes"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/urls.py".into(), "urls.py".into()]
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
        let prefilter = PreFilter::new()
            .with_name_patterns(&["urls.py"])
            .with_markers(&["urlpatterns", "django.urls"]);
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

/// `path("users/", views.user_list)` / `re_path(r"^users/$", ...)`.
/// Django routes carry no verb; GET is recorded as the access method.
fn extract_routes(
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
    for call in &unit.calls {
        if call.receiver.is_some() || !matches!(call.name.as_str(), "path" | "re_path" | "url") {
            continue;
        }
        let Some(route) = call.first_string_arg() else {
            continue;
        };
        let handler = call
            .args
            .iter()
            .filter(|a| a.name.is_none())
            .nth(1)
            .map(|a| a.value.clone());

        let route = route.trim_start_matches('^').trim_end_matches('$');
        let mut endpoint =
            ApiEndpoint::new(component_id, ApiKind::Rest, "GET", route.to_string());
        if let Some(handler) = handler {
            endpoint = endpoint.with_handler(handler);
        }
        findings.endpoints.push(endpoint);
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn urlpatterns_become_endpoints() {
        let source = r#"
from django.urls import path, re_path
from . import views

urlpatterns = [
    path("users/", views.user_list, name="user-list"),
    path("users/<int:pk>/", views.user_detail),
    re_path(r"^reports/$", views.reports),
]
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/urls.py"),
            relative: "shop/urls.py".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_routes(&parsers, "c", &file, source).unwrap();
        let paths: Vec<_> = findings.endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/users/", "/users/<int:pk>/", "/reports/"]);
        assert_eq!(findings.endpoints[0].handler.as_deref(), Some("views.user_list"));
    }
}
