//! Determinism: identical inputs always produce identical serialized
//! models, regardless of worker scheduling inside analyzers.

use std::fs;
use std::path::Path;

use archmap_analysis::aggregation::Aggregator;
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::PipelineDriver;
use archmap_core::config::ArchmapConfig;
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

fn polyglot_tree(root: &Path) {
    write_tree(
        root,
        &[
            (
                "pom.xml",
                r#"<project>
  <artifactId>poly</artifactId>
  <version>2.0</version>
  <dependencies>
    <dependency><groupId>org.springframework.boot</groupId><artifactId>spring-boot-starter-web</artifactId><version>3.2.0</version></dependency>
  </dependencies>
</project>"#,
            ),
            (
                "src/main/java/ItemController.java",
                r#"import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/items")
public class ItemController {
    @GetMapping
    public String list() { return null; }
    @PostMapping
    public String create() { return null; }
}
"#,
            ),
            (
                "schema.graphql",
                "type Item { id: ID! }\ntype Query { item(id: ID!): Item }\n",
            ),
            (
                "docker-compose.yml",
                "services:\n  api:\n    build: .\n  db:\n    image: postgres:16\n",
            ),
            (
                "migrations/001.sql",
                "CREATE TABLE items (id BIGINT PRIMARY KEY, name VARCHAR(64) NOT NULL);",
            ),
        ],
    );
}

fn scan_to_json(root: &Path, parallelism: usize) -> String {
    let registry = AnalyzerRegistry::with_builtins();
    let services = AnalyzerServices::new(2 * 1024 * 1024, parallelism);
    let driver = PipelineDriver::new(&registry, &services);
    let run = driver
        .run(root, &ArchmapConfig::default(), &NullEventHandler)
        .unwrap();

    let borrowed: Vec<(String, &ScanResult)> = run
        .results
        .iter()
        .map(|(id, result)| (id.clone(), result.as_ref()))
        .collect();
    Aggregator::new("poly", "2.0")
        .aggregate(&borrowed)
        .to_canonical_json()
        .unwrap()
}

#[test]
fn repeated_runs_serialize_identically() {
    let dir = tempfile::tempdir().unwrap();
    polyglot_tree(dir.path());

    let first = scan_to_json(dir.path(), 1);
    for _ in 0..3 {
        assert_eq!(first, scan_to_json(dir.path(), 1));
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let dir = tempfile::tempdir().unwrap();
    polyglot_tree(dir.path());

    let sequential = scan_to_json(dir.path(), 1);
    let parallel = scan_to_json(dir.path(), 4);
    assert_eq!(sequential, parallel);
}
