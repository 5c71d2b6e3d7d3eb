//! `archmap scan` — run the pipeline, aggregate, and render.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use archmap_analysis::aggregation::Aggregator;
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::PipelineDriver;
use archmap_core::config::ArchmapConfig;
use archmap_core::events::NullEventHandler;
use archmap_core::scan::ScanResult;
use archmap_render::GeneratorRegistry;

pub fn run(
    path: Option<&str>,
    config_path: Option<&str>,
    dry_run: bool,
    output: Option<&str>,
) -> Result<()> {
    let config = load_config(config_path)?;

    // Explicit path beats configured repositories; `.` is the fallback.
    let roots: Vec<PathBuf> = match path {
        Some(path) => vec![PathBuf::from(path)],
        None if !config.repositories.is_empty() => config
            .repositories
            .iter()
            .map(|r| PathBuf::from(&r.path))
            .collect(),
        None => vec![PathBuf::from(".")],
    };

    let services = AnalyzerServices::new(
        config.scanners.effective_max_file_size(),
        config.scanners.effective_parallelism(),
    );
    let registry = AnalyzerRegistry::with_builtins();
    let driver = PipelineDriver::new(&registry, &services);

    let mut all_results: Vec<(String, Arc<ScanResult>)> = Vec::new();
    for root in &roots {
        tracing::info!(root = %root.display(), "scanning");
        let run = driver
            .run(root, &config, &NullEventHandler)
            .with_context(|| format!("scanning {}", root.display()))?;
        for warning in &run.summary.warnings {
            eprintln!("warning: {warning}");
        }
        tracing::info!(
            executed = run.summary.executed,
            not_applicable = run.summary.not_applicable,
            failed = run.summary.failed,
            duration_ms = run.summary.duration_ms,
            "pipeline finished"
        );
        all_results.extend(run.results);
    }

    let borrowed: Vec<(String, &ScanResult)> = all_results
        .iter()
        .map(|(id, result)| (id.clone(), result.as_ref()))
        .collect();
    let model = Aggregator::new(
        config.effective_project_name(),
        config.project.version.clone(),
    )
    .with_source_paths(roots.iter().map(|r| r.display().to_string()).collect())
    .aggregate(&borrowed);

    println!(
        "Model: {} components, {} dependencies, {} endpoints, {} entities, {} flows, {} relationships",
        model.components.len(),
        model.dependencies.len(),
        model.endpoints.len(),
        model.entities.len(),
        model.flows.len(),
        model.relationships.len(),
    );

    if dry_run {
        println!("Dry run: generator output suppressed");
        return Ok(());
    }

    let output_dir = output
        .map(PathBuf::from)
        .or_else(|| config.output.directory.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("docs/architecture"));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let generators = GeneratorRegistry::with_builtins();
    let enabled: Vec<&str> = if config.generators.enabled.is_empty() {
        generators.ids().collect()
    } else {
        config.generators.enabled.iter().map(String::as_str).collect()
    };

    let mut written = Vec::new();
    for id in enabled {
        let Some(generator) = generators.get(id) else {
            eprintln!("warning: unknown generator '{id}', skipping");
            continue;
        };
        for file in generator.generate(&model)? {
            let target = output_dir.join(&file.relative_path);
            std::fs::write(&target, &file.content)
                .with_context(|| format!("writing {}", target.display()))?;
            written.push(file.relative_path);
        }
    }

    if config.output.generate_index.unwrap_or(true) && !written.is_empty() {
        let index = written
            .iter()
            .map(|f| format!("- [{f}]({f})\n"))
            .collect::<String>();
        let content = format!("# {} documentation\n\n{index}", model.project_name);
        std::fs::write(output_dir.join("index.md"), content)
            .with_context(|| "writing index.md")?;
    }

    println!("Wrote {} file(s) to {}", written.len(), output_dir.display());
    Ok(())
}

fn load_config(config_path: Option<&str>) -> Result<ArchmapConfig> {
    match config_path {
        Some(path) => {
            ArchmapConfig::load(Path::new(path)).map_err(anyhow::Error::from)
        }
        None => {
            let default = Path::new("archmap.yaml");
            if default.exists() {
                ArchmapConfig::load(default).map_err(anyhow::Error::from)
            } else {
                Ok(ArchmapConfig::default())
            }
        }
    }
}
