//! `codescape` — build a navigable 3D model of a JavaScript/TypeScript tree.
//!
//! ## Commands
//!
//! - `build <root>` - Parse, graph, lay out and print the visualization model as JSON
//!   (`--focus <id>` narrows it to one node and its children)
//! - `validate <file>` - Check a model JSON file; exit code 1 when invalid
//! - `engines` - List layout engines in selection order
//!
//! Logs go to stderr (`-v` info, `-vv` debug, `RUST_LOG` overrides).

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codescape_pipeline::{
    LayoutRegistry, Pipeline, PipelineConfig, VisualizationGraph, CONFIG_FILE_NAME,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod loader;

#[derive(Parser)]
#[command(name = "codescape", version, about = "Turn a source tree into a 3D visualization model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the visualization model for a directory
    Build {
        /// Project root to scan
        root: PathBuf,

        /// Pipeline config (defaults to <root>/codescape.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Layout engine to use instead of auto-selection
        #[arg(short, long)]
        engine: Option<String>,

        /// Zoom into one node and its direct children, e.g. a class id
        #[arg(long, value_name = "NODE_ID")]
        focus: Option<String>,

        /// Drop nodes above this level of detail
        #[arg(long)]
        max_lod: Option<u8>,

        /// Include external package nodes
        #[arg(long)]
        externals: bool,

        /// Include directory nodes
        #[arg(long)]
        directories: bool,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a visualization model JSON file
    Validate {
        file: PathBuf,
    },

    /// List layout engines in selection order
    Engines,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Build {
            root,
            config,
            engine,
            focus,
            max_lod,
            externals,
            directories,
            output,
            pretty,
        } => {
            let mut config = load_config(&root, config.as_deref())?;
            if engine.is_some() {
                config.engine = engine;
            }
            if focus.is_some() {
                config.focus = focus;
            }
            if max_lod.is_some() {
                config.max_lod = max_lod;
            }
            config.builder.include_external_packages |= externals;
            config.builder.include_directories |= directories;
            cmd_build(&root, config, output.as_deref(), pretty)
        }
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Engines => {
            for engine in LayoutRegistry::with_defaults().engine_types() {
                println!("{engine}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<PipelineConfig> {
    let mut config = match explicit {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                PipelineConfig::load(&candidate)
                    .with_context(|| format!("loading config {}", candidate.display()))?
            } else {
                PipelineConfig::default()
            }
        }
    };

    if config.root_path.is_none() {
        config.root_path = Some(root.display().to_string());
    }
    if config.name == PipelineConfig::default().name {
        if let Some(name) = root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        {
            config.name = name;
        }
    }
    Ok(config)
}

fn cmd_build(
    root: &Path,
    config: PipelineConfig,
    output: Option<&Path>,
    pretty: bool,
) -> Result<ExitCode> {
    let files = loader::collect_sources(root)?;
    let pipeline = Pipeline::with_defaults(config).context("configuring pipeline")?;
    let result = pipeline.run(&files).context("running pipeline")?;

    for issue in &result.build_issues {
        log::warn!("{}: {}", issue.path, issue.message);
    }

    let json = if pretty {
        result.graph.to_json_pretty()?
    } else {
        result.graph.to_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote model to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    let stats = &result.graph.metadata.stats;
    log::info!(
        "{} files -> {} nodes, {} edges (engine '{}')",
        files.len(),
        stats.total_nodes,
        stats.total_edges,
        result.engine
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(file: &Path) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let graph = VisualizationGraph::from_json(&raw)
        .with_context(|| format!("parsing {}", file.display()))?;
    let result = codescape_pipeline::validate(&graph);

    for error in &result.errors {
        println!("error: {error}");
    }
    for warning in &result.warnings {
        println!("warning: {warning}");
    }

    if result.valid {
        println!(
            "valid: {} nodes, {} edges, {} warning(s)",
            graph.nodes.len(),
            graph.edges.len(),
            result.warnings.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!("invalid: {} error(s)", result.errors.len());
        Ok(ExitCode::from(1))
    }
}
