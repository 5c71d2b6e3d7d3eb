//! GraphQL schema scenario: SDL types, inputs, and operations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use archmap_analysis::aggregation::Aggregator;
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::PipelineDriver;
use archmap_core::config::ArchmapConfig;
use archmap_core::events::NullEventHandler;
use archmap_core::model::ApiKind;
use archmap_core::scan::ScanResult;

const SCHEMA: &str = r#"
type User {
  id: ID!
  name: String!
}

input CreateUserInput {
  name: String!
}

type Query {
  getUser(id: ID!): User
}

type Mutation {
  createUser(input: CreateUserInput!): User
}
"#;

#[test]
fn graphql_schema_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(Path::new(dir.path()).join("schema.graphql"), SCHEMA).unwrap();

    let registry = AnalyzerRegistry::with_builtins();
    let services = AnalyzerServices::default();
    let driver = PipelineDriver::new(&registry, &services);
    let run = driver
        .run(dir.path(), &ArchmapConfig::default(), &NullEventHandler)
        .unwrap();

    let borrowed: Vec<(String, &ScanResult)> = run
        .results
        .iter()
        .map(|(id, result)| (id.clone(), result.as_ref()))
        .collect();
    let model = Aggregator::new("p", "1").aggregate(&borrowed);

    // Two entities with their GraphQL kinds.
    let user = model.entities.iter().find(|e| e.name == "User").unwrap();
    assert_eq!(user.entity_kind, "graphql-type");
    let input = model
        .entities
        .iter()
        .find(|e| e.name == "CreateUserInput")
        .unwrap();
    assert_eq!(input.entity_kind, "graphql-input");
    assert_eq!(model.entities.len(), 2);

    // Operation fields become endpoints keyed by operation name.
    let get_user = model.endpoints.iter().find(|e| e.path == "getUser").unwrap();
    assert_eq!(get_user.kind, ApiKind::GraphqlQuery);
    assert_eq!(get_user.method, "QUERY");
    assert_eq!(get_user.response_schema.as_deref(), Some("User"));

    let create_user = model
        .endpoints
        .iter()
        .find(|e| e.path == "createUser")
        .unwrap();
    assert_eq!(create_user.kind, ApiKind::GraphqlMutation);
    assert_eq!(create_user.method, "MUTATION");
    assert_eq!(create_user.response_schema.as_deref(), Some("User"));
    assert_eq!(create_user.request_schema.as_deref(), Some("CreateUserInput"));

    assert_eq!(model.endpoints.len(), 2);
}

#[test]
fn oversized_schema_is_skipped_by_the_configured_line_cap() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(Path::new(dir.path()).join("schema.graphql"), SCHEMA).unwrap();

    // SCHEMA is well over 5 lines; the cap makes it an oversized skip.
    let mut config = ArchmapConfig::default();
    let mut analyzer_config = BTreeMap::new();
    analyzer_config.insert(
        "max_schema_lines".to_string(),
        serde_yaml::Value::from(5u64),
    );
    config
        .scanners
        .config
        .insert("graphql-schema".to_string(), analyzer_config);

    let registry = AnalyzerRegistry::with_builtins();
    let services = AnalyzerServices::default();
    let driver = PipelineDriver::new(&registry, &services);
    let run = driver.run(dir.path(), &config, &NullEventHandler).unwrap();

    let (_, result) = run
        .results
        .iter()
        .find(|(id, _)| id == "graphql-schema")
        .expect("graphql-schema ran");
    assert_eq!(result.statistics.skipped, 1);
    assert_eq!(result.statistics.failed, 0);
    assert!(result.entities.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.contains("line cap")));
    assert!(result.statistics.is_consistent());
}
