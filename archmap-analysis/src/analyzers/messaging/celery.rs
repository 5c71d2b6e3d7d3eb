//! Celery analyzer: `@app.task` / `@shared_task` functions. The Celery
//! default queue is `celery`.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::MessageFlow;
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_python, Strategy};

pub struct CeleryAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(CeleryAnalyzer {
        kernel: AnalyzerKernel::new("celery-flows", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for CeleryAnalyzer {
    fn id(&self) -> &'static str {
        "celery-flows"
    }

    fn display_name(&self) -> &'static str {
        "Celery task flows"
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
        let prefilter = PreFilter::new().with_markers(&["celery", "shared_task"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_tasks(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn extract_tasks(
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
        let Some(annotation) = function.annotations.iter().find(|a| {
            a.simple_name() == "task" || a.simple_name() == "shared_task"
        }) else {
            continue;
        };

        let queue = annotation
            .named_arg("queue")
            .unwrap_or("celery")
            .to_string();

        findings.flows.push(
            MessageFlow::new(queue, function.name.clone(), "celery")
                .with_subscriber(component_id),
        );
    }
    Ok(findings)
}
