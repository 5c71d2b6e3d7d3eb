//! archmap command line entry point.
//!
//! Exit codes: 0 on success (including best-effort scans with analyzer
//! failures), 1 on configuration or fatal driver errors.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "archmap", version, about = "Architecture documentation generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a configuration stub (archmap.yaml).
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },
    /// List registered plugins.
    List {
        /// One of: scanners, generators, renderers.
        kind: String,
    },
    /// Scan one or more repositories and generate documentation.
    Scan {
        /// Root path to scan; defaults to configured repositories or `.`.
        path: Option<String>,
        /// Configuration file.
        #[arg(long, short)]
        config: Option<String>,
        /// Run the pipeline without writing generator output.
        #[arg(long)]
        dry_run: bool,
        /// Output directory.
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> ExitCode {
    // SCANNER_LOG_LEVEL controls verbosity only; no pipeline semantics.
    let filter = EnvFilter::try_from_env("SCANNER_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Init { force } => commands::init::run(force),
        Command::List { kind } => commands::list::run(&kind),
        Command::Scan {
            path,
            config,
            dry_run,
            output,
        } => commands::scan::run(path.as_deref(), config.as_deref(), dry_run, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
