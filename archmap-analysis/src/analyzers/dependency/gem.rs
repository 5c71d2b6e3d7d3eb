//! Ruby dependency analyzer: `Gemfile` groups, refined by
//! `Gemfile.lock` exact versions.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use archmap_core::errors::ParseError;
use archmap_core::model::{Component, ComponentType, Dependency, DependencyScope};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};
use regex::Regex;

use crate::analyzers::{finish_scan, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::strategies::{has_files, Strategy};

pub struct GemfileAnalyzer {
    kernel: AnalyzerKernel,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(GemfileAnalyzer {
        kernel: AnalyzerKernel::new("gem-deps", services),
    }))
}

impl Analyzer for GemfileAnalyzer {
    fn id(&self) -> &'static str {
        "gem-deps"
    }

    fn display_name(&self) -> &'static str {
        "Ruby gem dependencies"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["ruby"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["Gemfile".into(), "**/Gemfile".into()]
    }

    fn priority(&self) -> i32 {
        priority::DEPENDENCY
    }

    fn strategy(&self) -> Strategy {
        has_files(["Gemfile", "**/Gemfile"])
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let locked = collect_locked_versions(ctx, &self.kernel);

        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_name_patterns(&["Gemfile"]);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| parse_gemfile(file, text, &locked),
            None,
            &mut builder,
        );
        finish_scan(builder, timed_out)
    }
}

/// `    rails (7.1.3)` entries from every Gemfile.lock specs section.
fn collect_locked_versions(
    ctx: &ScanContext,
    kernel: &AnalyzerKernel,
) -> BTreeMap<String, String> {
    static LOCK_RE: OnceLock<Regex> = OnceLock::new();
    let lock_re = LOCK_RE.get_or_init(|| {
        Regex::new(r"(?m)^    ([a-zA-Z0-9_-]+) \(([^)]+)\)$").expect("static regex")
    });

    let index = kernel.index(ctx);
    let globs = ["Gemfile.lock".to_string(), "**/Gemfile.lock".to_string()];
    let mut versions = BTreeMap::new();
    for file in index.find_files_any(&globs) {
        if let Ok(text) = index.read_text(file) {
            for capture in lock_re.captures_iter(&text) {
                versions.insert(capture[1].to_string(), capture[2].to_string());
            }
        }
    }
    versions
}

fn gem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*gem\s+["']([^"']+)["'](?:\s*,\s*["']([^"']+)["'])?(.*)$"#)
            .expect("static regex")
    })
}

fn group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*group\s+(.+?)\s+do\s*$").expect("static regex"))
}

fn parse_gemfile(
    file: &DiscoveredFile,
    text: &str,
    locked: &BTreeMap<String, String>,
) -> Result<Findings, ParseError> {
    let mut findings = Findings::new();
    let name = file
        .relative
        .rsplit('/')
        .nth(1)
        .unwrap_or("ruby-app")
        .to_string();
    let component = Component::new(&name, ComponentType::Service)
        .with_technology("ruby")
        .with_source_location(file.relative.clone());
    let component_id = component.id.clone();
    findings.components.push(component);

    // Group blocks nest; track the stack of active group scopes.
    let mut group_stack: Vec<DependencyScope> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        if let Some(capture) = group_re().captures(line) {
            group_stack.push(scope_for_groups(&capture[1]));
            continue;
        }
        if trimmed == "end" && !group_stack.is_empty() {
            group_stack.pop();
            continue;
        }
        if let Some(capture) = gem_re().captures(line) {
            let gem_name = capture[1].to_string();
            let requirement = capture.get(2).map(|m| m.as_str().to_string());
            let trailing = capture.get(3).map(|m| m.as_str()).unwrap_or("");

            // Inline `group: :test` beats the enclosing block.
            let scope = inline_group_scope(trailing)
                .or_else(|| group_stack.last().copied())
                .unwrap_or(DependencyScope::Compile);

            // The lock file pins the exact resolved version.
            let version = locked
                .get(&gem_name)
                .cloned()
                .or(requirement)
                .unwrap_or_default();

            findings.dependencies.push(
                Dependency::new(&component_id, "", gem_name, version).with_scope(scope),
            );
        }
    }
    Ok(findings)
}

fn scope_for_groups(groups: &str) -> DependencyScope {
    let lowered = groups.to_ascii_lowercase();
    if lowered.contains(":test") {
        DependencyScope::Test
    } else if lowered.contains(":development") {
        DependencyScope::Development
    } else {
        DependencyScope::Compile
    }
}

fn inline_group_scope(trailing: &str) -> Option<DependencyScope> {
    if !trailing.contains("group") {
        return None;
    }
    Some(scope_for_groups(trailing))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file() -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from("/p/Gemfile"),
            relative: "Gemfile".to_string(),
            size_bytes: 1,
        }
    }

    const GEMFILE: &str = r#"source "https://rubygems.org"

gem 'rails', '~> 7.0'
gem 'sidekiq'
gem 'pry', group: :development

group :test do
  gem 'rspec-rails'
end
"#;

    #[test]
    fn groups_map_to_scopes() {
        let findings = parse_gemfile(&file(), GEMFILE, &BTreeMap::new()).unwrap();
        let by_name = |name: &str| {
            findings
                .dependencies
                .iter()
                .find(|d| d.artifact_id == name)
                .unwrap()
        };
        assert_eq!(by_name("rails").scope, DependencyScope::Compile);
        assert_eq!(by_name("rails").version, "~> 7.0");
        assert_eq!(by_name("rspec-rails").scope, DependencyScope::Test);
        assert_eq!(by_name("pry").scope, DependencyScope::Development);
    }

    #[test]
    fn lock_file_refines_versions() {
        let mut locked = BTreeMap::new();
        locked.insert("rails".to_string(), "7.1.3".to_string());
        locked.insert("sidekiq".to_string(), "7.2.1".to_string());
        let findings = parse_gemfile(&file(), GEMFILE, &locked).unwrap();
        let rails = findings
            .dependencies
            .iter()
            .find(|d| d.artifact_id == "rails")
            .unwrap();
        assert_eq!(rails.version, "7.1.3");
    }
}
