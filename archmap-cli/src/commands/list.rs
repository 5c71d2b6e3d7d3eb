//! `archmap list <kind>` — enumerate registered plugins.

use anyhow::{bail, Result};
use archmap_analysis::analyzers::AnalyzerRegistry;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_analysis::pipeline::PipelineDriver;
use archmap_render::GeneratorRegistry;

pub fn run(kind: &str) -> Result<()> {
    match kind {
        "scanners" => {
            let registry = AnalyzerRegistry::with_builtins();
            let services = AnalyzerServices::default();
            let driver = PipelineDriver::new(&registry, &services);
            println!("{:<22} {:>8}  {:<12} NAME", "ID", "PRIORITY", "LANGUAGES");
            for analyzer in driver.registered_analyzers() {
                println!(
                    "{:<22} {:>8}  {:<12} {}",
                    analyzer.id(),
                    analyzer.priority(),
                    analyzer.languages().join(","),
                    analyzer.display_name(),
                );
            }
        }
        "generators" | "renderers" => {
            let registry = GeneratorRegistry::with_builtins();
            for generator in registry.iter() {
                println!("{:<12} {}", generator.id(), generator.display_name());
            }
        }
        other => bail!("unknown kind '{other}' (expected scanners, generators, or renderers)"),
    }
    Ok(())
}
