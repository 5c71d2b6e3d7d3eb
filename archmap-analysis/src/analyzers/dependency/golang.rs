//! Go dependency analyzer: `go.mod`.

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct GoModAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(GoModAnalyzer {
        kernel: AnalyzerKernel::new("go-deps", services),
    }))
}

impl Analyzer for GoModAnalyzer {
    fn id(&self) -> &'static str {
        "go-deps"
    }

    fn display_name(&self) -> &'static str {
        "Go module dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["go.mod".into(), "**/go.mod".into()]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["go.mod", "**/go.mod"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["go.mod"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_go_mod(file, text),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

/// Line-oriented go.mod walk: `module`, single-line `require`, and
/// `require ( … )` blocks. `// indirect` entries are kept but flagged.
fn parse_go_mod(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let mut module_path = None;
    let mut requirements: Vec<(String, String, bool)> = Vec::new();
    let mut in_require_block = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(rest) = line.strip_prefix("module ") {
            module_path = Some(rest.trim().to_string());
            continue;
        }
        if line == "require (" {
            in_require_block = true;
            continue;
        }
        if in_require_block && line == ")" {
            in_require_block = false;
            continue;
        }

        let requirement = if in_require_block {
            Some(line)
        } else {
            line.strip_prefix("require ").map(str::trim)
        };
        if let Some(requirement) = requirement {
            let indirect = requirement.contains("// indirect");
            let requirement = requirement.split("//").next().unwrap_or("").trim();
            let mut parts = requirement.split_whitespace();
            if let (Some(path), Some(version)) = (parts.next(), parts.next()) {
                requirements.push((path.to_string(), version.to_string(), indirect));
            }
        }
    }

    let module_path = module_path.ok_or_else(|| ParseError::Malformed {
        path: file.path.clone(),
        message: "go.mod has no module directive".to_string(),
    })?;

    let name = module_path
        .rsplit('/')
        .next()
        .unwrap_or(&module_path)
        .to_string();

    let mut findings = Findings::new();
    let mut component = Component::new(&name, ComponentType::Service)
        .with_technology("go")
        .with_source_location(file.relative.clone());
    component
        .metadata
        .insert("module".to_string(), module_path.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    for (path, version, indirect) in requirements {
        let (group, artifact) = match path.rsplit_once('/') {
            Some((group, artifact)) => (group.to_string(), artifact.to_string()),
            None => (String::new(), path.clone()),
        };
        let mut dependency = Dependency::new(&component_id, group, artifact, version);
        dependency.direct = !indirect;
        findings.dependencies.push(dependency);
    }
    Ok(findings)
}
