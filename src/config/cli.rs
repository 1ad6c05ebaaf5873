use std::path::PathBuf;

use clap::Parser;

// Define command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// PDF files or directories containing PDFs, processed in the given order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path to the run configuration YAML file. Built-in defaults are used when omitted.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Directory for the Parquet tables, the renamed-file archive and results.json
    #[arg(short = 'o', long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Retry every failed document once after the batch completes
    #[arg(long)]
    pub retry_failed: bool,

    /// Optional: Port for the Prometheus metrics HTTP endpoint
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Validate the run configuration and exit
    #[arg(long)]
    pub validate_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
