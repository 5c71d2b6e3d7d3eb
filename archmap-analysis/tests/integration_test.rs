//! End-to-end pipeline scenarios over real temp directory trees.

use std::fs;
use std::path::Path;

use archmap_analysis::aggregation::Aggregator;
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::{PipelineDriver, PipelineRun};
use archmap_core::config::ArchmapConfig;
use archmap_core::events::NullEventHandler;
use archmap_core::model::{ArchitectureModel, ConfidenceLevel};
use archmap_core::scan::statistics::ErrorKind;
use archmap_core::scan::ScanResult;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn run_pipeline(root: &Path, config: &ArchmapConfig) -> (PipelineRun, ArchitectureModel) {
    let registry = AnalyzerRegistry::with_builtins();
    let services = AnalyzerServices::default();
    let driver = PipelineDriver::new(&registry, &services);
    let run = driver.run(root, config, &NullEventHandler).unwrap();

    let borrowed: Vec<(String, &ScanResult)> = run
        .results
        .iter()
        .map(|(id, result)| (id.clone(), result.as_ref()))
        .collect();
    let model = Aggregator::new("test-project", "0.0.0").aggregate(&borrowed);
    (run, model)
}

fn assert_statistics_consistent(run: &PipelineRun) {
    for (id, result) in &run.results {
        assert!(
            result.statistics.is_consistent(),
            "statistics invariant violated for {id}: {:?}",
            result.statistics
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO: SPRING + JPA PROJECT
// ═══════════════════════════════════════════════════════════════════════════

const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <groupId>com.example</groupId>
  <artifactId>shop-backend</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-web</artifactId>
      <version>3.2.0</version>
    </dependency>
    <dependency>
      <groupId>org.springframework.boot</groupId>
      <artifactId>spring-boot-starter-data-jpa</artifactId>
      <version>3.2.0</version>
    </dependency>
  </dependencies>
</project>
"#;

const USER_CONTROLLER: &str = r#"package com.example.api;

import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/api/users")
public class UserController {
    @GetMapping
    public java.util.List<User> list() { return null; }

    @GetMapping("/{id}")
    public User get(@PathVariable Long id) { return null; }

    @PostMapping
    public User create(@RequestBody User user) { return null; }
}
"#;

const USER_ENTITY: &str = r#"package com.example.model;

import jakarta.persistence.*;

@Entity
@Table(name = "users")
public class User {
    @Id
    private Long id;

    private String name;

    @OneToMany
    private java.util.List<Order> orders;
}
"#;

#[test]
fn spring_jpa_project_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            ("pom.xml", POM),
            ("src/main/java/com/example/api/UserController.java", USER_CONTROLLER),
            ("src/main/java/com/example/model/User.java", USER_ENTITY),
        ],
    );

    let (run, model) = run_pipeline(dir.path(), &ArchmapConfig::default());
    assert_statistics_consistent(&run);

    // Project component from the pom.
    let project = model
        .components
        .iter()
        .find(|c| c.name == "shop-backend")
        .expect("project component");

    // Both starters found.
    let artifacts: Vec<_> = model
        .dependencies
        .iter()
        .map(|d| d.artifact_id.as_str())
        .collect();
    assert!(artifacts.contains(&"spring-boot-starter-web"));
    assert!(artifacts.contains(&"spring-boot-starter-data-jpa"));
    assert!(model.dependencies.len() >= 2);

    // Three endpoints, class-level + method-level paths concatenated.
    let mut routes: Vec<_> = model
        .endpoints
        .iter()
        .map(|e| (e.method.clone(), e.path.clone()))
        .collect();
    routes.sort();
    assert_eq!(
        routes,
        vec![
            ("GET".to_string(), "/api/users".to_string()),
            ("GET".to_string(), "/api/users/{id}".to_string()),
            ("POST".to_string(), "/api/users".to_string()),
        ]
    );
    for endpoint in &model.endpoints {
        assert_eq!(endpoint.component_id, project.id);
        assert_eq!(endpoint.confidence, ConfidenceLevel::High);
    }

    // One entity: table `users`, pk `id`, three fields.
    assert_eq!(model.entities.len(), 1);
    let users = &model.entities[0];
    assert_eq!(users.name, "users");
    assert_eq!(users.primary_key.as_deref(), Some("id"));
    assert_eq!(users.fields.len(), 3);
    assert_eq!(users.confidence, ConfidenceLevel::High);

    // User depends on Order via the collection.
    let relationship = model
        .relationships
        .iter()
        .find(|r| r.description == "One-to-Many")
        .expect("one-to-many relationship");
    assert_eq!(relationship.source_id, archmap_core::component_id("User"));
    assert_eq!(relationship.target_id, archmap_core::component_id("Order"));

    // Everything parsed structurally.
    for dependency in &model.dependencies {
        assert_eq!(dependency.confidence, ConfidenceLevel::High);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO: FASTAPI WITH A BROKEN FILE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn fastapi_with_syntax_error_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            (
                "app/main.py",
                r#"from fastapi import FastAPI

app = FastAPI()

@app.get("/users")
def list_users():
    return []
"#,
            ),
            (
                "app/bad.py",
                "from fastapi import FastAPI\n\ndef broken()\n    return 1\n",
            ),
        ],
    );

    let (run, model) = run_pipeline(dir.path(), &ArchmapConfig::default());
    assert_statistics_consistent(&run);

    // One project component (synthesized, no manifest present).
    assert_eq!(model.components.len(), 1);

    // The healthy file still yields its endpoint at HIGH confidence.
    let endpoint = model
        .endpoints
        .iter()
        .find(|e| e.path == "/users" && e.method == "GET")
        .expect("GET /users endpoint");
    assert_eq!(endpoint.confidence, ConfidenceLevel::High);

    // The broken file is a recorded parse failure, not a crash.
    let stats = &model.statistics["fastapi-rest"];
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.error_kinds.get(&ErrorKind::Parse), Some(&1));
    assert!(stats.parsed_successfully >= 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// SCENARIO: GEMFILE + RAILS CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn gemfile_groups_and_rails_actions() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            (
                "Gemfile",
                r#"source "https://rubygems.org"

gem 'rails', '~> 7.0'

group :test do
  gem 'rspec-rails'
end
"#,
            ),
            (
                "app/controllers/users_controller.rb",
                r#"class UsersController < ApplicationController
  def index
  end

  def show
  end

  def create
  end
end
"#,
            ),
        ],
    );

    let (run, model) = run_pipeline(dir.path(), &ArchmapConfig::default());
    assert_statistics_consistent(&run);

    let rails = model
        .dependencies
        .iter()
        .find(|d| d.artifact_id == "rails")
        .expect("rails gem");
    assert_eq!(rails.scope.name(), "compile");
    assert_eq!(rails.version, "~> 7.0");

    let rspec = model
        .dependencies
        .iter()
        .find(|d| d.artifact_id == "rspec-rails")
        .expect("rspec-rails gem");
    assert_eq!(rspec.scope.name(), "test");

    let mut routes: Vec<_> = model
        .endpoints
        .iter()
        .map(|e| (e.method.clone(), e.path.clone()))
        .collect();
    routes.sort();
    assert_eq!(
        routes,
        vec![
            ("GET".to_string(), "/users".to_string()),
            ("GET".to_string(), "/users/:id".to_string()),
            ("POST".to_string(), "/users".to_string()),
        ]
    );
}
