// src/config.rs

pub mod cli;
pub mod run;

pub use cli::Args;
pub use run::{load_run_config, ExportConfig, PacingConfig, RunConfig, ServiceConfig};
