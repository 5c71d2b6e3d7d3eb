//! Maven dependency analyzer: `pom.xml` → project component +
//! dependencies, with `${property}` interpolation.

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency, DependencyScope};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct MavenAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(MavenAnalyzer {
        kernel: AnalyzerKernel::new("maven-deps", services),
    }))
}

impl Analyzer for MavenAnalyzer {
    fn id(&self) -> &'static str {
        "maven-deps"
    }

    fn display_name(&self) -> &'static str {
        "Maven dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["pom.xml".into(), "**/pom.xml".into()]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["pom.xml", "**/pom.xml"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["pom.xml"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_pom(file, text),
            Some(&fallback_pom),
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

#[derive(Debug, Default)]
struct PomModel {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    packaging: Option<String>,
    parent_group_id: Option<String>,
    parent_version: Option<String>,
    properties: BTreeMap<String, String>,
    dependencies: Vec<(String, String, String, Option<String>)>,
}

/// Tier 1: event-based XML walk tracking the element path, so only
/// `project/dependencies/dependency` entries count (dependencyManagement
/// and plugin blocks are excluded).
fn parse_pom(file: &DiscoveredFile, text: &str) -> Result<Findings, ParseError> {
    let pom = read_pom(text).map_err(|message| ParseError::Malformed {
        path: file.path.clone(),
        message,
    })?;

    let artifact_id = pom
        .artifact_id
        .clone()
        .ok_or_else(|| ParseError::Malformed {
            path: file.path.clone(),
            message: "pom.xml has no artifactId".to_string(),
        })?;

    let version = pom
        .version
        .clone()
        .or_else(|| pom.parent_version.clone())
        .unwrap_or_default();
    let group = pom
        .group_id
        .clone()
        .or_else(|| pom.parent_group_id.clone())
        .unwrap_or_default();

    let mut findings = Findings::new();
    let mut component = Component::new(&artifact_id, ComponentType::Service)
        .with_technology("maven")
        .with_source_location(file.relative.clone());
    component
        .metadata
        .insert("groupId".to_string(), group.clone());
    component
        .metadata
        .insert("version".to_string(), version.clone());
    if let Some(packaging) = &pom.packaging {
        component
            .metadata
            .insert("packaging".to_string(), packaging.clone());
    }
    let component_id = component.id.clone();
    findings.components.push(component);

    for (dep_group, dep_artifact, dep_version, scope) in &pom.dependencies {
        let resolved_version = interpolate(dep_version, &pom);
        let dependency = Dependency::new(
            &component_id,
            interpolate(dep_group, &pom),
            interpolate(dep_artifact, &pom),
            resolved_version,
        )
        .with_scope(scope.as_deref().map(DependencyScope::normalize).unwrap_or_default());
        findings.dependencies.push(dependency);
    }

    Ok(findings)
}

fn read_pom(text: &str) -> Result<PomModel, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut pom = PomModel::default();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<(String, String, String, Option<String>)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                path.push(tag);
                if path_is(&path, &["project", "dependencies", "dependency"]) {
                    current = Some((String::new(), String::new(), String::new(), None));
                }
            }
            Ok(Event::End(_)) => {
                if path_is(&path, &["project", "dependencies", "dependency"]) {
                    if let Some((group, artifact, version, scope)) = current.take() {
                        if !artifact.is_empty() {
                            pom.dependencies.push((group, artifact, version, scope));
                        }
                    }
                }
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let value = t
                    .unescape()
                    .map(|v| v.into_owned())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                if value.is_empty() {
                    continue;
                }
                record_text(&mut pom, &mut current, &path, value);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML error at byte {}: {e}", reader.buffer_position())),
        }
    }
    Ok(pom)
}

fn record_text(
    pom: &mut PomModel,
    current: &mut Option<(String, String, String, Option<String>)>,
    path: &[String],
    value: String,
) {
    if let Some(dep) = current.as_mut() {
        if let [.., parent, leaf] = path {
            if parent == "dependency" {
                match leaf.as_str() {
                    "groupId" => dep.0 = value,
                    "artifactId" => dep.1 = value,
                    "version" => dep.2 = value,
                    "scope" => dep.3 = Some(value),
                    _ => {}
                }
            }
        }
        return;
    }

    match path {
        [p, leaf] if p == "project" => match leaf.as_str() {
            "groupId" => pom.group_id = Some(value),
            "artifactId" => pom.artifact_id = Some(value),
            "version" => pom.version = Some(value),
            "packaging" => pom.packaging = Some(value),
            _ => {}
        },
        [p, parent, leaf] if p == "project" && parent == "parent" => match leaf.as_str() {
            "groupId" => pom.parent_group_id = Some(value),
            "version" => pom.parent_version = Some(value),
            _ => {}
        },
        [p, props, key] if p == "project" && props == "properties" => {
            pom.properties.insert(key.clone(), value);
        }
        _ => {}
    }
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

/// Resolve `${property}` references against `<properties>` and the
/// project coordinates. Unresolvable references stay verbatim.
fn interpolate(value: &str, pom: &PomModel) -> String {
    if !value.contains("${") {
        return value.to_string();
    }
    let mut result = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                let resolved = match key {
                    "project.version" | "version" => pom
                        .version
                        .clone()
                        .or_else(|| pom.parent_version.clone()),
                    "project.groupId" => {
                        pom.group_id.clone().or_else(|| pom.parent_group_id.clone())
                    }
                    _ => pom.properties.get(key).cloned(),
                };
                match resolved {
                    Some(v) => result.push_str(&v),
                    None => {
                        result.push_str("${");
                        result.push_str(key);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str("${");
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// Tier 2: regex over dependency blocks for poms quick-xml rejects.
fn fallback_pom(file: &DiscoveredFile, text: &str) -> Findings {
    use std::sync::OnceLock;
    static BLOCK_RE: OnceLock<regex::Regex> = OnceLock::new();
    static FIELD_RE: OnceLock<regex::Regex> = OnceLock::new();

    let mut findings = Findings::new();
    let artifact_re = BLOCK_RE.get_or_init(|| {
        regex::Regex::new(r"(?s)<dependency>\s*(.*?)</dependency>").expect("static regex")
    });
    let field_re = FIELD_RE.get_or_init(|| {
        regex::Regex::new(r"<(groupId|artifactId|version|scope)>([^<]+)</(?:groupId|artifactId|version|scope)>")
            .expect("static regex")
    });

    let name = file
        .relative
        .rsplit('/')
        .nth(1)
        .unwrap_or("maven-project")
        .to_string();
    let component = Component::new(&name, ComponentType::Service)
        .with_technology("maven")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    for block in artifact_re.captures_iter(text) {
        let mut group = String::new();
        let mut artifact = String::new();
        let mut version = String::new();
        let mut scope = None;
        for field in field_re.captures_iter(&block[1]) {
            let value = field[2].trim().to_string();
            match &field[1] {
                "groupId" => group = value,
                "artifactId" => artifact = value,
                "version" => version = value,
                "scope" => scope = Some(value),
                _ => {}
            }
        }
        if !artifact.is_empty() {
            findings.dependencies.push(
                Dependency::new(&component_id, group, artifact, version).with_scope(
                    scope.as_deref().map(DependencyScope::normalize).unwrap_or_default(),
                ),
            );
        }
    }
    findings
}
