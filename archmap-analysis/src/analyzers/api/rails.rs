//! Rails controller analyzer: RESTful action conventions on
//! `*Controller` classes.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_ruby, Strategy};

pub struct RailsAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(RailsAnalyzer {
        kernel: AnalyzerKernel::new("rails-rest", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for RailsAnalyzer {
    fn id(&self) -> &'static str {
        "rails-rest"
    }

    fn display_name(&self) -> &'static str {
        "Rails controller endpoints"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["ruby"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*_controller.rb".into(), "*_controller.rb".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_ruby()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new()
            .with_name_patterns(&["*_controller.rb"])
            .with_markers(&["ApplicationController", "ActionController"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_actions(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

/// The seven conventional resource actions. `(action, verb, suffix)`.
const RESOURCE_ACTIONS: &[(&str, &str, &str)] = &[
    ("index", "GET", ""),
    ("show", "GET", "/:id"),
    ("new", "GET", "/new"),
    ("create", "POST", ""),
    ("edit", "GET", "/:id/edit"),
    ("update", "PUT", "/:id"),
    ("destroy", "DELETE", "/:id"),
];

fn extract_actions(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let unit = parsers.parse(text, &file.path, Language::Ruby)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();
    for class in &unit.classes {
        let is_controller = class.name.ends_with("Controller")
            && class
                .extends
                .as_deref()
                .is_some_and(|base| base.contains("Controller"));
        if !is_controller || class.name == "ApplicationController" {
            continue;
        }

        let resource = resource_path(&class.name);
        for method in &class.methods {
            let Some((_, verb, suffix)) = RESOURCE_ACTIONS
                .iter()
                .find(|(action, _, _)| method.name == *action)
            else {
                continue;
            };
            findings.endpoints.push(
                ApiEndpoint::new(
                    component_id,
                    ApiKind::Rest,
                    *verb,
                    format!("/{resource}{suffix}"),
                )
                .with_handler(format!("{}#{}", class.name, method.name)),
            );
        }
    }
    Ok(findings)
}

/// `UsersController` → `users`, `OrderItemsController` → `order_items`.
fn resource_path(controller: &str) -> String {
    let base = controller.strip_suffix("Controller").unwrap_or(controller);
    let mut snake = String::with_capacity(base.len() + 4);
    for (i, c) in base.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn restful_actions_map_to_routes() {
        let source = r#"
class UsersController < ApplicationController
  def index
  end

  def show
  end

  def create
  end

  def internal_helper
  end
end
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/users_controller.rb"),
            relative: "app/controllers/users_controller.rb".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_actions(&parsers, "c", &file, source).unwrap();
        let routes: Vec<_> = findings
            .endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![("GET", "/users"), ("GET", "/users/:id"), ("POST", "/users")]
        );
    }

    #[test]
    fn compound_names_become_snake_case() {
        assert_eq!(resource_path("OrderItemsController"), "order_items");
        assert_eq!(resource_path("UsersController"), "users");
    }
}
