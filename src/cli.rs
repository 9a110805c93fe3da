use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::Pattern;

use crate::diff::Mode;
use crate::exclude::ARCHIVE_FILE;

/// Filter the files that changed in a local Maven repository and zip them.
#[derive(Parser, Debug)]
#[command(name = "depfilter", author, version, about, long_about = None)]
pub struct Args {
    /// Dependency directory to scan (e.g. ~/.m2/repository)
    #[arg(short, long)]
    pub dependency: PathBuf,

    /// compare: files added/removed since the last run; latest: files touched within --interval of the newest one
    #[arg(long, default_value = "compare")]
    pub mode: String,

    /// Time window in minutes for latest mode
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub interval: i64,

    /// Archive path (default: <dependency>/dependency-filter.zip)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Glob patterns to exclude from the scan (can be repeated or comma separated)
    #[arg(short = 'x', long, value_delimiter = ',', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Do not write anything; only print what would be archived
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct Options {
    pub root: PathBuf,
    pub mode: Mode,
    pub interval: i64,
    pub archive_path: PathBuf,
    pub exclude_patterns: Vec<Pattern>,
    pub dry_run: bool,
}

pub fn build_options(args: &Args) -> Result<Options> {
    let root = args
        .dependency
        .canonicalize()
        .with_context(|| format!("dependency not found: {:?}", args.dependency))?;
    if !root.is_dir() {
        bail!("dependency is not a directory: {:?}", root);
    }

    let mode: Mode = args.mode.parse()?;

    let patterns = args
        .exclude
        .iter()
        .map(|s| Pattern::new(s).with_context(|| format!("Invalid glob pattern: {s}")))
        .collect::<Result<Vec<_>>>()?;

    let archive_path = args
        .output
        .clone()
        .unwrap_or_else(|| root.join(ARCHIVE_FILE));

    Ok(Options {
        root,
        mode,
        interval: args.interval,
        archive_path,
        exclude_patterns: patterns,
        dry_run: args.dry_run,
    })
}
