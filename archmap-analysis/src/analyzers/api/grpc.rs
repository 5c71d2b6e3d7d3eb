//! gRPC analyzer: `service` / `rpc` declarations in `.proto` files.

use std::sync::OnceLock;

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct GrpcAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(GrpcAnalyzer {
        kernel: AnalyzerKernel::new("grpc-services", services),
    }))
}

impl Analyzer for GrpcAnalyzer {
    fn id(&self) -> &'static str {
        "grpc-services"
    }

    fn display_name(&self) -> &'static str {
        "gRPC services"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["protobuf", "java", "go", "python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.proto".into(), "*.proto".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_files(["**/*.proto", "*.proto"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["*.proto"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_proto(&component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn service_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)service\s+(\w+)\s*\{(.*?)\}").expect("static regex")
    })
}

fn rpc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"rpc\s+(\w+)\s*\(\s*(stream\s+)?([\w.]+)\s*\)\s*returns\s*\(\s*(stream\s+)?([\w.]+)\s*\)")
            .expect("static regex")
    })
}

/// Statement-oriented proto walk: each `service` block yields one
/// endpoint per `rpc`. Streaming qualifiers are recorded as metadata on
/// the method label.
fn parse_proto(
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    if !text.contains("service") && !text.contains("message") {
        return Err(ParseError::Unsupported {
            path: file.path.clone(),
            message: "no service or message declarations".to_string(),
        });
    }

    let mut findings = Findings::new();
    for service in service_re().captures_iter(text) {
        let service_name = &service[1];
        for rpc in rpc_re().captures_iter(&service[2]) {
            let rpc_name = &rpc[1];
            let mut endpoint = ApiEndpoint::new(
                component_id,
                ApiKind::Grpc,
                rpc_name.to_string(),
                format!("{service_name}/{rpc_name}"),
            )
            .with_handler(service_name.to_string())
            .with_request_schema(rpc[3].to_string())
            .with_response_schema(rpc[5].to_string());

            if rpc.get(2).is_some() || rpc.get(4).is_some() {
                endpoint.parameters.push("Streaming".to_string());
            }
            findings.endpoints.push(endpoint);
        }
    }
    Ok(findings)
}
