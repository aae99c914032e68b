//! codemap: map the structure and relationships of a source tree
//!
//! Extracts imports, classes, functions and calls from every supported file
//! and resolves file dependencies, inheritance and the call graph.

mod config;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codemap_graph::{Granularity, GraphBuilder};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::{CODEMAP_DIR, CONFIG_FILE, Config, DEFAULT_CONFIG};
use render::Format;

/// Map the structure and relationships of a polyglot source tree
#[derive(Parser)]
#[command(name = "codemap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to .codemap directory (default: search for .codemap/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to daily rolling files in this directory instead of stderr
    #[arg(long, global = true, env = "CODEMAP_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a source tree and print its code map
    Analyze {
        /// Directory to analyze (default: project root from config or current dir)
        path: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extraction depth
        #[arg(long, value_parser = parse_granularity)]
        granularity: Option<Granularity>,

        /// Keep `_private` classes, functions and methods
        #[arg(long)]
        include_private: bool,

        /// Skip doc text extraction
        #[arg(long)]
        no_docstrings: bool,

        /// Skip parameter and return-type extraction
        #[arg(long)]
        no_signatures: bool,

        /// Worker threads for extraction
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Maximum directory depth to traverse (default: 10)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Initialize a new .codemap directory with config file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn parse_granularity(s: &str) -> std::result::Result<Granularity, String> {
    s.parse()
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize logging to stderr.
fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(verbose))
        .init();
}

/// Initialize logging to rotating files in `logs_dir` with daily rotation.
fn init_file_logging(logs_dir: &Path, verbose: bool) {
    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        eprintln!("Warning: Failed to create logs directory: {}", e);
        init_logging(verbose);
        return;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, logs_dir, "codemap.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the writer thread.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(env_filter(verbose))
        .init();
}

/// Load config from the given directory or auto-discover `.codemap/config.toml`.
///
/// Returns the config and the `.codemap` directory it came from (for
/// resolving relative paths).
fn load_config(override_path: Option<&PathBuf>) -> Result<(Config, Option<PathBuf>)> {
    if let Some(path) = override_path {
        let config_file = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.clone()
        };
        let codemap_dir = config_file.parent().unwrap_or(path).to_path_buf();
        let config = Config::from_file(&config_file)?;
        info!("Loaded config from {}", config_file.display());
        return Ok((config, Some(codemap_dir)));
    }

    match Config::find_and_load() {
        Ok(Some((config, codemap_dir))) => {
            info!("Found config at {}", codemap_dir.display());
            Ok((config, Some(codemap_dir)))
        }
        Ok(None) => {
            tracing::debug!("No .codemap/config.toml found, using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => {
            tracing::warn!("Error searching for config: {}, using defaults", e);
            Ok((Config::default(), None))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.log_dir {
        Some(dir) => init_file_logging(dir, cli.verbose),
        None => init_logging(cli.verbose),
    }

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            granularity,
            include_private,
            no_docstrings,
            no_signatures,
            jobs,
            max_depth,
        } => {
            let (config, codemap_dir) = load_config(cli.config.as_ref())?;
            for error in config.validate() {
                tracing::warn!("Config: {}", error);
            }

            let mut options = config.analysis_options();
            if let Some(granularity) = granularity {
                options = options.with_granularity(granularity);
            }
            if include_private {
                options = options.with_private(true);
            }
            if no_docstrings {
                options = options.with_docstrings(false);
            }
            if no_signatures {
                options = options.with_signatures(false);
            }
            if let Some(jobs) = jobs {
                options = options.with_parallelism(jobs);
            }

            let format = match format {
                Some(format) => format,
                None => config
                    .output
                    .format
                    .parse()
                    .map_err(anyhow::Error::msg)?,
            };
            let output = output.or_else(|| config.resolve_output_path(codemap_dir.as_deref()));

            let root = path.unwrap_or_else(|| config.resolve_root(codemap_dir.as_deref()));
            // Canonicalize to resolve relative paths like "." or ".."
            let root = root.canonicalize().unwrap_or(root);

            info!(
                "Analyzing {} ({} granularity)",
                root.display(),
                options.granularity.as_str()
            );

            let mut discovery = config.discovery_options();
            if max_depth.is_some() {
                discovery.max_depth = max_depth;
            }

            let builder = GraphBuilder::new(options);
            let analysis = builder
                .build_directory(&root, &discovery)
                .with_context(|| format!("Failed to analyze {}", root.display()))?;

            let root_name = root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string());
            let report = render::render(&analysis, format, &root_name)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, report)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote code map to {}", path.display());
                }
                None => println!("{report}"),
            }
        }

        Commands::Init { force } => {
            let codemap_dir = cli.config.unwrap_or_else(|| PathBuf::from(CODEMAP_DIR));
            let config_path = codemap_dir.join(CONFIG_FILE);

            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    config_path.display()
                );
            }

            if !codemap_dir.exists() {
                std::fs::create_dir_all(&codemap_dir)?;
                info!("Created {}/", codemap_dir.display());
            }

            std::fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            println!("Created {}", config_path.display());
        }
    }

    Ok(())
}
