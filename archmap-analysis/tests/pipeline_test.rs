//! Pipeline driver behavior: modes, ordering, and unknown ids.

use std::fs;
use std::path::Path;

use archmap_analysis::aggregation::Aggregator;
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::PipelineDriver;
use archmap_core::config::{ArchmapConfig, ScannerMode};
use archmap_core::events::NullEventHandler;
use archmap_core::scan::ScanResult;

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn driver() -> PipelineDriver {
    let registry = AnalyzerRegistry::with_builtins();
    let services = AnalyzerServices::default();
    PipelineDriver::new(&registry, &services)
}

const POM: &str = r#"<project>
  <artifactId>demo</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency><groupId>g</groupId><artifactId>a</artifactId><version>1</version></dependency>
  </dependencies>
</project>"#;

// ═══════════════════════════════════════════════════════════════════════════
// MODES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn unknown_explicit_id_warns_and_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("pom.xml", POM)]);

    let mut config = ArchmapConfig::default();
    config.scanners.mode = ScannerMode::Explicit;
    config.scanners.enabled = vec!["maven-deps-typo".to_string()];

    let run = driver().run(dir.path(), &config, &NullEventHandler).unwrap();

    assert_eq!(run.summary.unknown_ids, vec!["maven-deps-typo".to_string()]);
    assert!(run.summary.warnings[0].contains("maven-deps-typo"));
    assert!(run.summary.warnings[0].contains("maven-deps"));
    assert_eq!(run.summary.executed, 0);
    assert!(run.results.is_empty());

    let model = Aggregator::new("p", "1").aggregate(&[]);
    assert_eq!(model.finding_count(), 0);
}

#[test]
fn explicit_mode_runs_only_listed_analyzers() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(dir.path(), &[("pom.xml", POM), ("schema.graphql", "type Query { ping: String }")]);

    let mut config = ArchmapConfig::default();
    config.scanners.mode = ScannerMode::Explicit;
    config.scanners.enabled = vec!["maven-deps".to_string()];

    let run = driver().run(dir.path(), &config, &NullEventHandler).unwrap();
    let executed: Vec<_> = run.results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(executed, vec!["maven-deps"]);
}

#[test]
fn groups_mode_matches_language_tags() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("pom.xml", POM),
            ("Gemfile", "gem 'rails'\n"),
        ],
    );

    let mut config = ArchmapConfig::default();
    config.scanners.mode = ScannerMode::Groups;
    config.scanners.groups = vec!["java".to_string()];

    let run = driver().run(dir.path(), &config, &NullEventHandler).unwrap();
    for (id, _) in &run.results {
        assert_ne!(id, "gem-deps", "ruby analyzer ran in a java-only group");
    }
    assert!(run.results.iter().any(|(id, _)| id == "maven-deps"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ORDERING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn execution_order_is_priority_then_id() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("pom.xml", POM),
            ("schema.graphql", "type Query { ping: String }"),
            ("app/main.py", "from fastapi import FastAPI\napp = FastAPI()\n"),
        ],
    );

    let run = driver()
        .run(dir.path(), &ArchmapConfig::default(), &NullEventHandler)
        .unwrap();

    let driver = driver();
    let priority_of = |wanted: &str| {
        driver
            .registered_analyzers()
            .find(|a| a.id() == wanted)
            .map(|a| a.priority())
            .unwrap()
    };

    // Scanning bands are non-increasing by priority; the post-processor
    // phase (≥ 150) runs after all of them.
    let priorities: Vec<i32> = run
        .results
        .iter()
        .map(|(id, _)| priority_of(id))
        .collect();
    let scanning: Vec<i32> = priorities.iter().copied().filter(|p| *p < 150).collect();
    let mut sorted = scanning.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(scanning, sorted, "scanning order not by priority: {priorities:?}");

    let first_post = priorities.iter().position(|p| *p >= 150);
    if let Some(first_post) = first_post {
        assert!(
            priorities[first_post..].iter().all(|p| *p >= 150),
            "post-processors interleaved with scanners: {priorities:?}"
        );
    }
}

#[test]
fn registered_analyzers_sorted_within_bands_by_id() {
    let driver = driver();
    let listed: Vec<(i32, &str)> = driver
        .registered_analyzers()
        .map(|a| (a.priority(), a.id()))
        .filter(|(p, _)| *p < 150)
        .collect();
    for window in listed.windows(2) {
        let (p1, id1) = window[0];
        let (p2, id2) = window[1];
        assert!(p1 > p2 || (p1 == p2 && id1 < id2), "{id1} vs {id2}");
    }

    // The post-processor phase comes last.
    let all: Vec<i32> = driver.registered_analyzers().map(|a| a.priority()).collect();
    let first_post = all.iter().position(|p| *p >= 150).unwrap();
    assert!(all[first_post..].iter().all(|p| *p >= 150));
}

// ═══════════════════════════════════════════════════════════════════════════
// DEPENDENT ANALYZERS SEE PRIOR RESULTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn api_analyzers_attach_to_the_manifest_component() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("pom.xml", POM),
            (
                "src/main/java/PingController.java",
                r#"import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/ping")
public class PingController {
    @GetMapping
    public String ping() { return "pong"; }
}
"#,
            ),
        ],
    );

    let run = driver()
        .run(dir.path(), &ArchmapConfig::default(), &NullEventHandler)
        .unwrap();
    let borrowed: Vec<(String, &ScanResult)> = run
        .results
        .iter()
        .map(|(id, result)| (id.clone(), result.as_ref()))
        .collect();
    let model = Aggregator::new("p", "1").aggregate(&borrowed);

    let project = model.components.iter().find(|c| c.name == "demo").unwrap();
    let endpoint = model.endpoints.iter().find(|e| e.path == "/ping").unwrap();
    assert_eq!(endpoint.component_id, project.id);
}
