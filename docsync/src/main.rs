//! docsync: move Javadoc comments out of a Java source tree into JSON
//! sidecars, and back.
//!
//! - `docsync extract --sources src --docs docs`
//! - `docsync strip --sources src`
//! - `docsync apply --sources src --docs docs`
//! - `docsync covered --sources src --docs docs`

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use docsync::config::{normalize_extension, Config, FileConfig, DEFAULT_DOC_EXTENSION};
use docsync::workspace::{self, Report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docsync",
    version,
    about = "Move Javadoc comments between a Java source tree and JSON sidecars"
)]
struct Cli {
    /// TOML config file; command-line flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of worker threads (default: one per core)
    #[arg(short = 'j', long, global = true)]
    jobs: Option<usize>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a sidecar for every documented source file
    Extract {
        #[command(flatten)]
        tree: TreeArgs,

        /// Keep existing files in the docs directory
        #[arg(long)]
        no_clean: bool,
    },
    /// Write sidecar documentation back into the source files
    Apply {
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Remove all javadoc comments from the source files
    Strip {
        /// Java source root
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Strip package-info.java files too (left alone by default)
        #[arg(long)]
        include_package_info: bool,
    },
    /// List source files that have a sidecar
    Covered {
        /// Java source root
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Sidecar root
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Sidecar file extension
        #[arg(long)]
        doc_extension: Option<String>,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// Java source root
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Sidecar root
    #[arg(long)]
    docs: Option<PathBuf>,

    /// Extra type source: a source directory or a file of binary type names
    #[arg(long)]
    classpath: Vec<PathBuf>,

    /// Sidecar file extension
    #[arg(long)]
    doc_extension: Option<String>,

    /// Leave package-info.java files alone
    #[arg(long)]
    skip_package_info: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FileConfig::default(),
    };

    if let Some(jobs) = cli.jobs.or(file.jobs) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to set up worker threads")?;
    }

    match &cli.command {
        Command::Extract { tree, no_clean } => {
            let mut config = tree_config(tree, &file)?;
            config.clean = !no_clean;
            let report = workspace::extract_tree(&config).context("extract failed")?;
            finish("extract", "sidecars written", &report)
        }
        Command::Apply { tree } => {
            let config = tree_config(tree, &file)?;
            let report = workspace::apply_tree(&config).context("apply failed")?;
            finish("apply", "source files updated", &report)
        }
        Command::Strip {
            sources,
            include_package_info,
        } => {
            let sources = require(sources.clone().or(file.sources.clone()), "--sources")?;
            let skip = !include_package_info && file.skip_package_info.unwrap_or(true);
            let report = workspace::strip_tree(&sources, skip).context("strip failed")?;
            finish("strip", "source files stripped", &report)
        }
        Command::Covered {
            sources,
            docs,
            doc_extension,
        } => {
            let sources = require(sources.clone().or(file.sources.clone()), "--sources")?;
            let docs = require(docs.clone().or(file.docs.clone()), "--docs")?;
            let extension = doc_extension
                .as_deref()
                .or(file.doc_extension.as_deref())
                .unwrap_or(DEFAULT_DOC_EXTENSION);
            let config = Config::new(sources, docs).with_doc_extension(extension);
            for path in workspace::covered_sources(&config).context("covered failed")? {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

/// Command-line values win over the config file.
fn tree_config(tree: &TreeArgs, file: &FileConfig) -> Result<Config> {
    let sources = require(tree.sources.clone().or(file.sources.clone()), "--sources")?;
    let docs = require(tree.docs.clone().or(file.docs.clone()), "--docs")?;
    let mut config = Config::new(sources, docs);

    config.classpath = file.classpath.clone();
    config.classpath.extend(tree.classpath.iter().cloned());
    if let Some(extension) = tree.doc_extension.as_deref().or(file.doc_extension.as_deref()) {
        config.doc_extension = normalize_extension(extension);
    }
    config.skip_package_info = tree.skip_package_info || file.skip_package_info.unwrap_or(false);
    Ok(config)
}

fn require(value: Option<PathBuf>, flag: &str) -> Result<PathBuf> {
    value.with_context(|| format!("{flag} is required (on the command line or in the config file)"))
}

fn finish(command: &str, what: &str, report: &Report) -> Result<()> {
    tracing::info!(
        "{command}: {} {what}, {} unchanged, {} skipped, {} failed",
        report.written,
        report.unchanged,
        report.skipped,
        report.failures.len()
    );
    if !report.is_success() {
        anyhow::bail!(
            "{command}: {} of {} files failed",
            report.failures.len(),
            report.total()
        );
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
