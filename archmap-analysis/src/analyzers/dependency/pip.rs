//! Python dependency analyzer: `requirements*.txt` + `pyproject.toml`
//! (PEP 621 and poetry tables).

use std::sync::OnceLock;

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency, DependencyScope};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct PipAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(PipAnalyzer {
        kernel: AnalyzerKernel::new("pip-deps", services),
    }))
}

impl Analyzer for PipAnalyzer {
    fn id(&self) -> &'static str {
        "pip-deps"
    }

    fn display_name(&self) -> &'static str {
        "Python dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["python"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec![
            "requirements*.txt".into(),
            "**/requirements*.txt".into(),
            "pyproject.toml".into(),
            "**/pyproject.toml".into(),
        ]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files([
            "requirements*.txt",
            "**/requirements*.txt",
            "pyproject.toml",
            "**/pyproject.toml",
        ])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter =
            PreFilter::new().with_name_patterns(&["requirements*.txt", "pyproject.toml"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_python_manifest(file, text),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

fn parse_python_manifest(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    if file.relative.ends_with("pyproject.toml") {
        parse_pyproject(file, text)
    } else {
        Ok(parse_requirements(file, text))
    }
}

/// `name==1.0`, `name>=2,<3`, `name[extra]~=1.4`; comments and options
/// are skipped.
fn requirement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9][A-Za-z0-9._-]*)(?:\[[^\]]*\])?\s*(?:(==|>=|<=|~=|!=|>|<)\s*([^;,\s#]+))?")
            .expect("static regex")
    })
}

fn parse_requirements(file: &DiscoveredFile, text: &str) -> Findings {
    let mut findings = Findings::new();
    let name = file
        .relative
        .rsplit('/')
        .nth(1)
        .unwrap_or("python-project")
        .to_string();
    let component = Component::new(&name, ComponentType::Service)
        .with_technology("python")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    let file_name = file.relative.rsplit('/').next().unwrap_or("");
    let scope = if file_name.contains("dev") || file_name.contains("test") {
        DependencyScope::Development
    } else {
        DependencyScope::Compile
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(capture) = requirement_re().captures(line) {
            let version = match (capture.get(2), capture.get(3)) {
                (Some(op), Some(v)) if op.as_str() == "==" => v.as_str().to_string(),
                (Some(op), Some(v)) => format!("{}{}", op.as_str(), v.as_str()),
                _ => String::new(),
            };
            findings.dependencies.push(
                Dependency::new(&component_id, "", &capture[1], version).with_scope(scope),
            );
        }
    }
    findings
}

fn parse_pyproject(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let doc: toml::Value = toml::from_str(text).map_err(|e| ParseError::Malformed {
        path: file.path.clone(),
        message: e.to_string(),
    })?;

    let mut findings = Findings::new();
    let name = doc
        .get("project")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .or_else(|| {
            doc.get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get("name"))
                .and_then(|n| n.as_str())
        })
        .unwrap_or("python-project")
        .to_string();

    let component = Component::new(&name, ComponentType::Service)
        .with_technology("python")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    // PEP 621: project.dependencies = ["fastapi>=0.100", ...]
    if let Some(deps) = doc
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        for entry in deps.iter().filter_map(|v| v.as_str()) {
            if let Some(capture) = requirement_re().captures(entry) {
                let version = capture.get(3).map(|v| v.as_str()).unwrap_or("");
                findings
                    .dependencies
                    .push(Dependency::new(&component_id, "", &capture[1], version));
            }
        }
    }

    // Poetry: [tool.poetry.dependencies] name = "^1.0" (python itself excluded)
    for (table, scope) in [
        ("dependencies", DependencyScope::Compile),
        ("dev-dependencies", DependencyScope::Development),
    ] {
        if let Some(deps) = doc
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get(table))
            .and_then(|d| d.as_table())
        {
            for (dep_name, value) in deps {
                if dep_name == "python" {
                    continue;
                }
                let version = value
                    .as_str()
                    .map(String::from)
                    .or_else(|| {
                        value
                            .get("version")
                            .and_then(|v| v.as_str())
                            .map(String::from)
                    })
                    .unwrap_or_default();
                findings.dependencies.push(
                    Dependency::new(&component_id, "", dep_name, version).with_scope(scope),
                );
            }
        }
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(rel: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from(format!("/p/{rel}")),
            relative: rel.to_string(),
            size_bytes: 1,
        }
    }

    #[test]
    fn requirements_lines_parse() {
        let text = "fastapi==0.110.0\nuvicorn[standard]>=0.27\n# comment\n-r other.txt\ncelery\n";
        let findings = parse_requirements(&file("requirements.txt"), text);
        assert_eq!(findings.dependencies.len(), 3);
        assert_eq!(findings.dependencies[0].artifact_id, "fastapi");
        assert_eq!(findings.dependencies[0].version, "0.110.0");
        assert_eq!(findings.dependencies[1].version, ">=0.27");
        assert_eq!(findings.dependencies[2].version, "");
    }

    #[test]
    fn dev_requirements_get_development_scope() {
        let findings = parse_requirements(&file("requirements-dev.txt"), "pytest==8.0.0\n");
        assert_eq!(findings.dependencies[0].scope, DependencyScope::Development);
    }

    #[test]
    fn pyproject_pep621_and_poetry() {
        let text = r#"
[project]
name = "orders"
dependencies = ["fastapi>=0.100", "sqlalchemy==2.0.25"]

[tool.poetry.dependencies]
python = "^3.11"
celery = "^5.3"

[tool.poetry.dev-dependencies]
pytest = "^8.0"
"#;
        let findings = parse_pyproject(&file("pyproject.toml"), text).unwrap();
        assert_eq!(findings.components[0].name, "orders");
        let artifacts: Vec<_> = findings
            .dependencies
            .iter()
            .map(|d| d.artifact_id.as_str())
            .collect();
        assert_eq!(artifacts, vec!["fastapi", "sqlalchemy", "celery", "pytest"]);
        assert_eq!(findings.dependencies[3].scope, DependencyScope::Development);
    }
}
