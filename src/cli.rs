//! CLI argument parsing for loglifecycle

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for pass reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "loglifecycle")]
#[command(version)]
#[command(
    about = "Inject lifecycle trace logging into Android component classes",
    long_about = None
)]
pub struct Cli {
    /// Class pool to process (JSON class definitions)
    #[arg(short = 'p', long = "pool", value_name = "FILE")]
    pub pool: PathBuf,

    /// Transformer configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log full error chains for failed classes and methods
    #[arg(short, long)]
    pub debug: bool,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Number of worker threads for the pass
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value = "1")]
    pub jobs: usize,

    /// Do not register the Android framework base classes in the pool
    #[arg(long = "no-stubs")]
    pub no_stubs: bool,

    /// Classes to process (default: every class in the pool)
    #[arg(value_name = "CLASS")]
    pub classes: Vec<String>,
}
