//! Applicability strategies — cheap, pure predicates over the scan
//! context deciding whether an analyzer runs at all.
//!
//! Atomic strategies check file presence (glob over the walked set) or
//! dependency presence (substring over prior dependency findings);
//! combinators compose them. Evaluation never parses a file.

use archmap_core::scan::ScanContext;

/// A composable applicability predicate.
#[derive(Debug, Clone)]
pub struct Strategy(Node);

#[derive(Debug, Clone)]
enum Node {
    Always,
    Never,
    HasFiles(Vec<String>),
    HasAnyDependency(Vec<String>),
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
}

impl Strategy {
    /// Evaluate against a context. Read-only and side-effect free.
    pub fn evaluate(&self, ctx: &ScanContext) -> bool {
        eval(&self.0, ctx)
    }
}

fn eval(node: &Node, ctx: &ScanContext) -> bool {
    match node {
        Node::Always => true,
        Node::Never => false,
        Node::HasFiles(globs) => {
            let patterns: Vec<&str> = globs.iter().map(String::as_str).collect();
            ctx.files.has_match(&patterns)
        }
        Node::HasAnyDependency(names) => names
            .iter()
            .any(|name| dependency_present(ctx, name)),
        Node::And(children) => children.iter().all(|c| eval(c, ctx)),
        Node::Or(children) => children.iter().any(|c| eval(c, ctx)),
        Node::Not(child) => !eval(child, ctx),
    }
}

/// Case-insensitive substring match against group or artifact of every
/// dependency found by analyzers that already ran. Direct dependencies
/// only — transitive resolution is out of scope.
fn dependency_present(ctx: &ScanContext, name: &str) -> bool {
    let needle = name.to_ascii_lowercase();
    ctx.previous_results.values().any(|result| {
        result.dependencies.iter().any(|dep| {
            dep.group_id.to_ascii_lowercase().contains(&needle)
                || dep.artifact_id.to_ascii_lowercase().contains(&needle)
        })
    })
}

// ─── Atomic strategies ─────────────────────────────────────────────────────

pub fn always_apply() -> Strategy {
    Strategy(Node::Always)
}

pub fn never_apply() -> Strategy {
    Strategy(Node::Never)
}

/// True iff any walked file matches one of the globs.
pub fn has_files<I, S>(globs: I) -> Strategy
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Strategy(Node::HasFiles(globs.into_iter().map(Into::into).collect()))
}

/// True iff a prior result contains a dependency whose group or artifact
/// contains `name` (case-insensitive).
pub fn has_dependency(name: impl Into<String>) -> Strategy {
    Strategy(Node::HasAnyDependency(vec![name.into()]))
}

pub fn has_any_dependency<I, S>(names: I) -> Strategy
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Strategy(Node::HasAnyDependency(
        names.into_iter().map(Into::into).collect(),
    ))
}

// ─── Combinators ───────────────────────────────────────────────────────────

pub fn and<I>(strategies: I) -> Strategy
where
    I: IntoIterator<Item = Strategy>,
{
    Strategy(Node::And(strategies.into_iter().map(|s| s.0).collect()))
}

pub fn or<I>(strategies: I) -> Strategy
where
    I: IntoIterator<Item = Strategy>,
{
    Strategy(Node::Or(strategies.into_iter().map(|s| s.0).collect()))
}

pub fn not(strategy: Strategy) -> Strategy {
    Strategy(Node::Not(Box::new(strategy.0)))
}

// ─── Language-family shorthands ────────────────────────────────────────────

pub fn has_java() -> Strategy {
    has_files(["**/*.java"])
}

pub fn has_python() -> Strategy {
    has_files(["**/*.py"])
}

pub fn has_csharp() -> Strategy {
    has_files(["**/*.cs"])
}

pub fn has_go() -> Strategy {
    has_files(["**/*.go", "go.mod"])
}

pub fn has_ruby() -> Strategy {
    has_files(["**/*.rb", "Gemfile"])
}

pub fn has_javascript() -> Strategy {
    has_files(["**/*.js", "**/*.jsx", "**/*.ts", "**/*.tsx", "package.json"])
}

// ─── Framework shorthands ──────────────────────────────────────────────────

pub fn has_spring() -> Strategy {
    and([has_java(), has_any_dependency(["spring-boot", "spring-web", "spring-context"])])
}

pub fn has_jaxrs() -> Strategy {
    and([
        has_java(),
        has_any_dependency(["javax.ws.rs", "jakarta.ws.rs", "jersey", "resteasy"]),
    ])
}

pub fn has_jpa() -> Strategy {
    and([
        has_java(),
        has_any_dependency(["spring-data-jpa", "hibernate", "javax.persistence", "jakarta.persistence"]),
    ])
}

pub fn has_kafka() -> Strategy {
    has_any_dependency(["kafka"])
}

pub fn has_fastapi() -> Strategy {
    and([has_python(), has_dependency("fastapi")])
}

pub fn has_flask() -> Strategy {
    and([has_python(), has_dependency("flask")])
}

pub fn has_django() -> Strategy {
    and([has_python(), has_dependency("django")])
}

pub fn has_sqlalchemy() -> Strategy {
    and([has_python(), has_dependency("sqlalchemy")])
}

pub fn has_celery() -> Strategy {
    and([has_python(), has_dependency("celery")])
}

pub fn has_aspnet_core() -> Strategy {
    and([has_csharp(), has_any_dependency(["Microsoft.AspNetCore", "Swashbuckle"])])
}

pub fn has_entity_framework() -> Strategy {
    and([has_csharp(), has_dependency("EntityFrameworkCore")])
}

pub fn has_rails() -> Strategy {
    and([has_ruby(), has_dependency("rails")])
}

pub fn has_sidekiq() -> Strategy {
    and([has_ruby(), has_dependency("sidekiq")])
}

pub fn has_express() -> Strategy {
    and([has_javascript(), has_dependency("express")])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    use archmap_core::model::Dependency;
    use archmap_core::scan::{DiscoveredFile, FileSet, ScanResult};

    use super::*;

    fn context(files: &[&str], deps: &[(&str, &str)]) -> ScanContext {
        let set = FileSet::new(
            files
                .iter()
                .map(|rel| DiscoveredFile {
                    path: PathBuf::from(format!("/p/{rel}")),
                    relative: rel.to_string(),
                    size_bytes: 1,
                })
                .collect(),
        );
        let mut result = ScanResult::empty("maven-deps");
        for (group, artifact) in deps {
            result
                .dependencies
                .push(Dependency::new("c", *group, *artifact, "1.0"));
        }
        let mut previous = BTreeMap::new();
        previous.insert("maven-deps".to_string(), Arc::new(result));
        ScanContext::new("/p", Arc::new(set)).with_previous_results(Arc::new(previous))
    }

    #[test]
    fn has_files_matches_globs() {
        let ctx = context(&["src/main/java/App.java"], &[]);
        assert!(has_java().evaluate(&ctx));
        assert!(!has_python().evaluate(&ctx));
    }

    #[test]
    fn dependency_match_is_case_insensitive_substring() {
        let ctx = context(&[], &[("org.springframework.boot", "spring-boot-starter-web")]);
        assert!(has_dependency("Spring-Boot").evaluate(&ctx));
        assert!(has_dependency("springframework").evaluate(&ctx));
        assert!(!has_dependency("django").evaluate(&ctx));
    }

    #[test]
    fn combinators_compose() {
        let ctx = context(&["app/main.py"], &[("", "fastapi")]);
        assert!(has_fastapi().evaluate(&ctx));
        assert!(not(has_flask()).evaluate(&ctx));
        assert!(or([has_flask(), has_fastapi()]).evaluate(&ctx));
        assert!(!and([has_flask(), has_fastapi()]).evaluate(&ctx));
        assert!(always_apply().evaluate(&ctx));
        assert!(!never_apply().evaluate(&ctx));
    }

    #[test]
    fn spring_requires_both_sources_and_dependency() {
        let java_only = context(&["src/App.java"], &[]);
        assert!(!has_spring().evaluate(&java_only));

        let both = context(
            &["src/App.java"],
            &[("org.springframework.boot", "spring-boot-starter-web")],
        );
        assert!(has_spring().evaluate(&both));
    }

    #[test]
    fn framework_shorthands_match_their_stacks() {
        let rails_app = context(
            &["Gemfile", "app/models/user.rb"],
            &[("", "rails"), ("", "sidekiq")],
        );
        assert!(has_rails().evaluate(&rails_app));
        assert!(has_sidekiq().evaluate(&rails_app));
        assert!(!has_django().evaluate(&rails_app));

        let dotnet_app = context(
            &["Api/Program.cs"],
            &[("", "Microsoft.AspNetCore.OpenApi"), ("", "Microsoft.EntityFrameworkCore")],
        );
        assert!(has_aspnet_core().evaluate(&dotnet_app));
        assert!(has_entity_framework().evaluate(&dotnet_app));

        let java_app = context(
            &["src/Main.java"],
            &[("org.apache.kafka", "kafka-clients"), ("jakarta.ws.rs", "jakarta.ws.rs-api"), ("org.hibernate", "hibernate-core")],
        );
        assert!(has_kafka().evaluate(&java_app));
        assert!(has_jaxrs().evaluate(&java_app));
        assert!(has_jpa().evaluate(&java_app));

        let node_app = context(&["server.js", "package.json"], &[("", "express")]);
        assert!(has_express().evaluate(&node_app));

        let python_app = context(
            &["app/worker.py"],
            &[("", "celery"), ("", "sqlalchemy"), ("", "django")],
        );
        assert!(has_celery().evaluate(&python_app));
        assert!(has_sqlalchemy().evaluate(&python_app));
        assert!(has_django().evaluate(&python_app));
        assert!(!has_go().evaluate(&python_app));
    }
}
