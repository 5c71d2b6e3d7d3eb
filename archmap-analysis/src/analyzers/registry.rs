//! AnalyzerRegistry — the explicit plugin table.
//!
//! Plugins are registered as constructors indexed by analyzer id; the
//! driver constructs them at startup. A constructor that fails is logged
//! and excluded from the run, never fatal.

use crate::kernel::AnalyzerServices;

use super::Analyzer;

/// Fallible analyzer constructor.
pub type AnalyzerConstructor = fn(&AnalyzerServices) -> Result<Box<dyn Analyzer>, String>;

/// Table of analyzer constructors, ordered by registration.
pub struct AnalyzerRegistry {
    entries: Vec<(&'static str, AnalyzerConstructor)>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registry with every built-in analyzer.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        // Dependency family
        registry.register("maven-deps", super::dependency::maven::construct);
        registry.register("gradle-deps", super::dependency::gradle::construct);
        registry.register("npm-deps", super::dependency::npm::construct);
        registry.register("nuget-deps", super::dependency::nuget::construct);
        registry.register("pip-deps", super::dependency::pip::construct);
        registry.register("go-deps", super::dependency::golang::construct);
        registry.register("gem-deps", super::dependency::gem::construct);

        // Schema family
        registry.register("graphql-schema", super::schema::graphql::construct);
        registry.register("avro-schema", super::schema::avro::construct);

        // Data family
        registry.register("jpa-entities", super::data::jpa::construct);
        registry.register("sqlalchemy-entities", super::data::sqlalchemy::construct);
        registry.register("django-entities", super::data::django_orm::construct);
        registry.register("efcore-entities", super::data::efcore::construct);
        registry.register("sql-ddl", super::data::sql::construct);

        // Infra family
        registry.register("docker-compose", super::infra::docker_compose::construct);

        // API family
        registry.register("spring-rest", super::api::spring::construct);
        registry.register("jaxrs-rest", super::api::jaxrs::construct);
        registry.register("fastapi-rest", super::api::fastapi::construct);
        registry.register("flask-rest", super::api::flask::construct);
        registry.register("django-rest", super::api::django::construct);
        registry.register("aspnet-rest", super::api::aspnet::construct);
        registry.register("rails-rest", super::api::rails::construct);
        registry.register("express-rest", super::api::express::construct);
        registry.register("grpc-services", super::api::grpc::construct);

        // Messaging family
        registry.register("kafka-flows", super::messaging::kafka::construct);
        registry.register("sidekiq-flows", super::messaging::sidekiq::construct);
        registry.register("celery-flows", super::messaging::celery::construct);

        // Post-processors
        registry.register("rest-events", super::post::rest_events::construct);

        registry
    }

    pub fn register(&mut self, id: &'static str, constructor: AnalyzerConstructor) {
        self.entries.push((id, constructor));
    }

    /// All registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct every registered analyzer. Construction failures are
    /// logged and the plugin is excluded from the run.
    pub fn construct_all(&self, services: &AnalyzerServices) -> Vec<Box<dyn Analyzer>> {
        let mut analyzers = Vec::with_capacity(self.entries.len());
        for (id, constructor) in &self.entries {
            match constructor(services) {
                Ok(analyzer) => {
                    debug_assert_eq!(analyzer.id(), *id);
                    analyzers.push(analyzer);
                }
                Err(error) => {
                    tracing::warn!(analyzer = id, error = %error, "plugin failed to construct");
                }
            }
        }
        analyzers
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
