use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs; // For reading the file
use std::path::Path;

/// Represents the overall run configuration read from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub service: ServiceConfig,
    pub pacing: PacingConfig,
    pub export: ExportConfig,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        self.service.validate()?;
        self.pacing.validate()?;
        Ok(())
    }
}

/// Connection settings for the vision/OCR service used to classify and extract.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "FOLIOSCAN_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PipelineError::ConfigValidationError(format!(
                "ServiceConfig: base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "ServiceConfig: model cannot be empty".to_string(),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "ServiceConfig: api_key_env cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(PipelineError::ConfigValidationError(
                "ServiceConfig: timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pacing strategy between service requests.
/// Uses Serde's internally tagged enum representation.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PacingConfig {
    FixedDelay {
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
    },
    TokenBucket {
        requests_per_second: f64,
        burst_size: u32,
    },
    #[serde(rename = "none")]
    Disabled,
}

fn default_delay_ms() -> u64 {
    200
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig::FixedDelay {
            delay_ms: default_delay_ms(),
        }
    }
}

impl PacingConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            PacingConfig::FixedDelay { .. } | PacingConfig::Disabled => Ok(()),
            PacingConfig::TokenBucket {
                requests_per_second,
                burst_size,
            } => {
                if !requests_per_second.is_finite() || *requests_per_second <= 0.0 {
                    return Err(PipelineError::ConfigValidationError(format!(
                        "PacingConfig: requests_per_second must be greater than 0.0, got {}",
                        requests_per_second
                    )));
                }
                if *burst_size == 0 {
                    return Err(PipelineError::ConfigValidationError(
                        "PacingConfig: burst_size must be greater than 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Which outputs the binary writes after a batch.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// One Parquet table per document type.
    pub parquet: bool,
    /// Input files copied under their derived `archivo` names, one folder per type.
    pub archive: bool,
    /// JSON dump of every outcome, failures included.
    pub results_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            parquet: true,
            archive: true,
            results_json: true,
        }
    }
}

/// Loads and parses the run configuration YAML file.
pub fn load_run_config<P: AsRef<Path>>(config_path: P) -> Result<RunConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read run config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&config_content).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to parse run config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })
}
