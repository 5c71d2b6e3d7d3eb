//! Gradle dependency analyzer: `build.gradle` / `build.gradle.kts`.
//!
//! The Gradle DSL has no free grammar in the stack, so tier 1 is a
//! line-oriented parser over the dependency configurations.

use std::sync::OnceLock;

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency, DependencyScope};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct GradleAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(GradleAnalyzer {
        kernel: AnalyzerKernel::new("gradle-deps", services),
    }))
}

impl Analyzer for GradleAnalyzer {
    fn id(&self) -> &'static str {
        "gradle-deps"
    }

    fn display_name(&self) -> &'static str {
        "Gradle dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["java", "kotlin"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec![
            "build.gradle".into(),
            "build.gradle.kts".into(),
            "**/build.gradle".into(),
            "**/build.gradle.kts".into(),
        ]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["build.gradle", "build.gradle.kts", "**/build.gradle", "**/build.gradle.kts"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["build.gradle", "build.gradle.kts"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_gradle(file, text),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

/// `implementation 'g:a:v'`, `api("g:a:v")`, `testImplementation "g:a:v"`.
fn dependency_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^\s*(implementation|api|compile|compileOnly|runtimeOnly|testImplementation|testCompile|testRuntimeOnly|developmentOnly|annotationProcessor)\s*\(?\s*["']([^"':]+):([^"':]+):?([^"']*)["']"#,
        )
        .expect("static regex")
    })
}

fn parse_gradle(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let mut findings = Findings::new();

    // Module name: the directory holding the build file, or the root.
    let name = file
        .relative
        .rsplit('/')
        .nth(1)
        .unwrap_or("gradle-project")
        .to_string();
    let component = Component::new(&name, ComponentType::Service)
        .with_technology("gradle")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    for capture in dependency_line_re().captures_iter(text) {
        let configuration = &capture[1];
        let scope = match configuration {
            c if c.starts_with("test") => DependencyScope::Test,
            "runtimeOnly" => DependencyScope::Runtime,
            "developmentOnly" => DependencyScope::Development,
            _ => DependencyScope::Compile,
        };
        findings.dependencies.push(
            Dependency::new(
                &component_id,
                capture[2].trim(),
                capture[3].trim(),
                capture.get(4).map(|v| v.as_str().trim()).unwrap_or(""),
            )
            .with_scope(scope),
        );
    }

    if findings.dependencies.is_empty() && !text.contains("dependencies") {
        return Err(ParseError::Unsupported {
            path: file.path.clone(),
            message: "no dependency block found".to_string(),
        });
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
    fn parses_groovy_and_kotlin_notation() {
        let text = r#"
dependencies {
    implementation 'org.springframework.boot:spring-boot-starter-web:3.2.0'
    api("com.fasterxml.jackson.core:jackson-databind:2.16.0")
    testImplementation 'org.junit.jupiter:junit-jupiter:5.10.0'
    runtimeOnly 'org.postgresql:postgresql:42.7.1'
}
"#;
        let findings = parse_gradle(&file("build.gradle"), text).unwrap();
        assert_eq!(findings.dependencies.len(), 4);
        assert_eq!(findings.dependencies[0].artifact_id, "spring-boot-starter-web");
        assert_eq!(findings.dependencies[1].group_id, "com.fasterxml.jackson.core");
        assert_eq!(findings.dependencies[2].scope, DependencyScope::Test);
        assert_eq!(findings.dependencies[3].scope, DependencyScope::Runtime);
    }

    #[test]
    fn module_name_comes_from_directory() {
        let findings = parse_gradle(&file("billing/build.gradle"), "dependencies {}").unwrap();
        assert_eq!(findings.components[0].name, "billing");
    }
}
