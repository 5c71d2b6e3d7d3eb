//! npm dependency analyzer: `package.json`.

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency, DependencyScope};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct NpmAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(NpmAnalyzer {
        kernel: AnalyzerKernel::new("npm-deps", services),
    }))
}

impl Analyzer for NpmAnalyzer {
    fn id(&self) -> &'static str {
        "npm-deps"
    }

    fn display_name(&self) -> &'static str {
        "npm dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["javascript", "typescript"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["package.json".into(), "**/package.json".into()]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["package.json", "**/package.json"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["package.json"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_package_json(file, text),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

fn parse_package_json(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let package: PackageJson =
        serde_json::from_str(text).map_err(|e| ParseError::Malformed {
            path: file.path.clone(),
            message: e.to_string(),
        })?;

    let name = package
        .name
        .clone()
        .or_else(|| file.relative.rsplit('/').nth(1).map(String::from))
        .unwrap_or_else(|| "npm-package".to_string());

    let mut findings = Findings::new();
    let mut component = Component::new(&name, ComponentType::Service)
        .with_technology("node")
        .with_source_location(file.relative.clone());
    if let Some(version) = &package.version {
        component
            .metadata
            .insert("version".to_string(), version.clone());
    }
    let component_id = component.id.clone();
    findings.components.push(component);

    for (artifact, version) in &package.dependencies {
        findings
            .dependencies
            .push(Dependency::new(&component_id, "", artifact, version));
    }
    for (artifact, version) in &package.dev_dependencies {
        findings.dependencies.push(
            Dependency::new(&component_id, "", artifact, version)
                .with_scope(DependencyScope::Development),
        );
    }
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn scopes_split_by_section() {
        let file = DiscoveredFile {
            path: PathBuf::from("/p/package.json"),
            relative: "package.json".to_string(),
            size_bytes: 1,
        };
        let text = r#"{
  "name": "webshop",
  "version": "2.1.0",
  "dependencies": { "express": "^4.18.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#;
        let findings = parse_package_json(&file, text).unwrap();
        assert_eq!(findings.components[0].name, "webshop");
        assert_eq!(findings.dependencies.len(), 2);
        let express = findings.dependencies.iter().find(|d| d.artifact_id == "express").unwrap();
        assert_eq!(express.scope, DependencyScope::Compile);
        let jest = findings.dependencies.iter().find(|d| d.artifact_id == "jest").unwrap();
        assert_eq!(jest.scope, DependencyScope::Development);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = DiscoveredFile {
            path: PathBuf::from("/p/package.json"),
            relative: "package.json".to_string(),
            size_bytes: 1,
        };
        assert!(parse_package_json(&file, "{ not json").is_err());
    }
}
