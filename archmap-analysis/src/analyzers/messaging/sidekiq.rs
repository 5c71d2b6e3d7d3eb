//! Sidekiq analyzer: `include Sidekiq::Worker` classes and their queue
//! options. The Sidekiq default queue is `default`.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::MessageFlow;
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_ruby, Strategy};

pub struct SidekiqAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(SidekiqAnalyzer {
        kernel: AnalyzerKernel::new("sidekiq-flows", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for SidekiqAnalyzer {
    fn id(&self) -> &'static str {
        "sidekiq-flows"
    }

    fn display_name(&self) -> &'static str {
        "Sidekiq job flows"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["ruby"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.rb".into(), "*.rb".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_ruby()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_name_patterns(&["*_worker.rb", "*_job.rb"])
            .with_markers(&["Sidekiq::Worker", "Sidekiq::Job", "sidekiq_options"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_workers(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn extract_workers(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let unit = parsers.parse(text, &file.path, Language::Ruby)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();
    for class in &unit.classes {
        let is_worker = class
            .includes
            .iter()
            .any(|i| i == "Sidekiq::Worker" || i == "Sidekiq::Job");
        if !is_worker {
            continue;
        }

        // `sidekiq_options queue: "mailers"`, default queue otherwise.
        let queue = unit
            .calls
            .iter()
            .find(|c| c.name == "sidekiq_options" && c.receiver.is_none())
            .and_then(|c| c.named_arg("queue").map(|q| q.trim_start_matches(':').to_string()))
            .unwrap_or_else(|| "default".to_string());

        findings.flows.push(
            MessageFlow::new(queue, class.name.clone(), "sidekiq")
                .with_subscriber(component_id),
        );
    }
    Ok(findings)
}
