//! NuGet dependency analyzer: `.csproj` + `Directory.Build.props` /
//! `Directory.Packages.props` (central package versions).

use std::collections::BTreeMap;

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct NugetAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(NugetAnalyzer {
        kernel: AnalyzerKernel::new("nuget-deps", services),
    }))
}

impl Analyzer for NugetAnalyzer {
    fn id(&self) -> &'static str {
        "nuget-deps"
    }

    fn display_name(&self) -> &'static str {
        "NuGet dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["csharp"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec![
            "*.csproj".into(),
            "**/*.csproj".into(),
            "Directory.Build.props".into(),
            "**/Directory.Build.props".into(),
            "Directory.Packages.props".into(),
            "**/Directory.Packages.props".into(),
        ]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["*.csproj", "**/*.csproj"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        // Central versions from props files refine versionless
        // PackageReference entries, so collect them up front.
        let central = collect_central_versions(ctx, &self.kernel);

        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["*.csproj"]);
        let globs = vec!["*.csproj".to_string(), "**/*.csproj".to_string()];
        let timed_out = self.kernel.process_files(
            ctx,
            &globs,
            &prefilter,
            &|file, text| parse_csproj(file, text, &central),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

fn collect_central_versions(
    ctx: &ScanContext,
    kernel: &AnalyzerKernel,
) -> BTreeMap<String, String> {
    let index = kernel.index(ctx);
    let mut versions = BTreeMap::new();
    let globs = [
        "Directory.Build.props".to_string(),
        "**/Directory.Build.props".to_string(),
        "Directory.Packages.props".to_string(),
        "**/Directory.Packages.props".to_string(),
    ];
    for file in index.find_files_any(&globs) {
        if let Ok(text) = index.read_text(file) {
            if let Ok(refs) = read_package_references(&text) {
                for (name, version) in refs {
                    if !version.is_empty() {
                        versions.insert(name, version);
                    }
                }
            }
        }
    }
    versions
}

fn parse_csproj(
    file: &DiscoveredFile,
    text: &str,
    central: &BTreeMap<String, String>,
) -> Result<Findings, ParseError> {
    let references = read_package_references(text).map_err(|message| ParseError::Malformed {
        path: file.path.clone(),
        message,
    })?;

    let name = file
        .relative
        .rsplit('/')
        .next()
        .and_then(|n| n.strip_suffix(".csproj"))
        .unwrap_or("dotnet-project")
        .to_string();

    let mut findings = Findings::new();
    let component = Component::new(&name, ComponentType::Service)
        .with_technology("dotnet")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    for (artifact, version) in references {
        let version = if version.is_empty() {
            central.get(&artifact).cloned().unwrap_or_default()
        } else {
            version
        };
        findings
            .dependencies
            .push(Dependency::new(&component_id, "", artifact, version));
    }
    Ok(findings)
}

/// `<PackageReference Include="X" Version="1.2"/>` and
/// `<PackageVersion Include="X" Version="1.2"/>` entries.
fn read_package_references(text: &str) -> Result<Vec<(String, String)>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut references = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if tag == "PackageReference" || tag == "PackageVersion" {
                    let mut include = String::new();
                    let mut version = String::new();
                    for attribute in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
                        let value = attribute
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_default();
                        match key.as_str() {
                            "Include" => include = value,
                            "Version" => version = value,
                            _ => {}
                        }
                    }
                    if !include.is_empty() {
                        references.push((include, version));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML error: {e}")),
        }
    }
    Ok(references)
}
