//! The analyzer plugin protocol and the built-in plugin set.

pub mod api;
pub mod data;
pub mod dependency;
pub mod infra;
pub mod messaging;
pub mod post;
pub mod registry;
pub mod schema;

use archmap_core::model::ids::component_id;
use archmap_core::model::{Component, ComponentType, ConfidenceLevel};
use archmap_core::scan::{ScanContext, ScanResult, ScanResultBuilder};

use crate::strategies::Strategy;

pub use registry::AnalyzerRegistry;

/// Priority bands. Higher runs first; within a band the driver orders by
/// id. Dependency scanners run before everything that consumes their
/// findings through `hasDependency`.
pub mod priority {
    pub const DEPENDENCY: i32 = 80;
    pub const SCHEMA: i32 = 65;
    pub const DATA: i32 = 60;
    pub const INFRA: i32 = 55;
    pub const API: i32 = 50;
    pub const POST_PROCESS: i32 = 150;
}

/// One pluggable analyzer.
///
/// `applies` must be a pure predicate over the context; `scan` never
/// panics or errors out — fatal internal failures become a result with
/// `success == false`.
pub trait Analyzer: Send + Sync {
    /// Stable unique id (used in config, logs, and `previous_results`).
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// Language/stack tags; GROUPS mode matches against these.
    fn languages(&self) -> &'static [&'static str];

    /// Globs selecting candidate files for `scan`.
    fn file_globs(&self) -> Vec<String>;

    fn priority(&self) -> i32;

    /// The reusable applicability strategy for this analyzer.
    fn strategy(&self) -> Strategy;

    /// Gate evaluated by the driver before `scan`.
    fn applies(&self, ctx: &ScanContext) -> bool {
        self.strategy().evaluate(ctx)
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult;
}

/// The project component the current findings should attach to.
///
/// Dependency analyzers run first and register the project component;
/// later analyzers reuse it via `previous_results` so endpoints and
/// entities reference one consistent id. Falls back to the scan root's
/// directory name when no manifest was found.
pub fn project_component(ctx: &ScanContext) -> (String, String) {
    for (id, result) in ctx.previous_results.iter() {
        if !id.ends_with("-deps") {
            continue;
        }
        if let Some(component) = result.components.first() {
            return (component.id.clone(), component.name.clone());
        }
    }
    for result in ctx.previous_results.values() {
        if let Some(component) = result
            .components
            .iter()
            .find(|c| matches!(c.component_type, ComponentType::Service | ComponentType::Library))
        {
            return (component.id.clone(), component.name.clone());
        }
    }
    let name = ctx
        .root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    (component_id(&name), name)
}

/// Like [`project_component`], but also hands back a Component to emit
/// when no prior analyzer registered one: analyzers that only find
/// endpoints or entities still anchor them to a real component.
pub fn claim_project_component(ctx: &ScanContext) -> (String, Option<Component>) {
    let has_prior_component = ctx
        .previous_results
        .values()
        .any(|r| !r.components.is_empty());
    let (id, name) = project_component(ctx);
    if has_prior_component {
        (id, None)
    } else {
        let component = Component::new(&name, ComponentType::Service)
            .with_confidence(ConfidenceLevel::Medium);
        (id, Some(component))
    }
}

/// Finish a kernel-driven scan: a deadline hit turns the partial result
/// into `success = false` with a timeout error. The fallback component
/// is emitted only when the analyzer actually found something.
pub(crate) fn finish_scan_with(
    mut builder: ScanResultBuilder,
    fallback: Option<Component>,
    timed_out: bool,
) -> ScanResult {
    if builder.finding_count() > 0 {
        if let Some(component) = fallback {
            builder.component(component);
        }
    }
    finish_scan(builder, timed_out)
}

/// Finish a kernel-driven scan without a fallback component.
pub(crate) fn finish_scan(mut builder: ScanResultBuilder, timed_out: bool) -> ScanResult {
    if timed_out {
        builder.error("timeout: analyzer deadline exceeded, partial result");
        builder.build(false)
    } else {
        builder.build(true)
    }
}
