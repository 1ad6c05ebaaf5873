#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use FolioScan::config::run::*;
    use FolioScan::error::PipelineError;

    // Helper to create a temporary config file with given content
    fn create_temp_config_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "{}", content).expect("Failed to write to temp file");
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let yaml_content = r#"
service:
  base_url: "http://localhost:8080/v1"
  model: "vision-test"
  api_key_env: "TEST_KEY"
  timeout_secs: 30
pacing:
  strategy: token_bucket
  requests_per_second: 2.5
  burst_size: 3
export:
  parquet: false
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config = load_run_config(temp_file.path()).expect("Should load valid config");

        assert_eq!(config.service.base_url, "http://localhost:8080/v1");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(
            config.pacing,
            PacingConfig::TokenBucket {
                requests_per_second: 2.5,
                burst_size: 3
            }
        );
        assert!(!config.export.parquet);
        assert!(config.export.archive);
        assert!(config.export.results_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_file = create_temp_config_file("{}");
        let config = load_run_config(temp_file.path()).unwrap();
        assert_eq!(config.pacing, PacingConfig::FixedDelay { delay_ms: 200 });
        assert_eq!(config.service.api_key_env, "FOLIOSCAN_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_delay_defaults_its_delay() {
        let temp_file = create_temp_config_file("pacing:\n  strategy: fixed_delay\n");
        let config = load_run_config(temp_file.path()).unwrap();
        assert_eq!(config.pacing, PacingConfig::FixedDelay { delay_ms: 200 });
    }

    #[test]
    fn test_pacing_can_be_disabled() {
        let temp_file = create_temp_config_file("pacing:\n  strategy: none\n");
        let config = load_run_config(temp_file.path()).unwrap();
        assert_eq!(config.pacing, PacingConfig::Disabled);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_run_config("non_existent_config.yaml");
        match result.err().unwrap() {
            PipelineError::ConfigError(msg) => {
                assert!(msg.contains("Failed to read run config file"));
                assert!(msg.contains("non_existent_config.yaml"));
            }
            other => panic!("Expected ConfigError for non-existent file, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp_file = create_temp_config_file("service:\n  endpoint: \"http://x\"\n");
        match load_run_config(temp_file.path()).err().unwrap() {
            PipelineError::ConfigError(msg) => {
                assert!(msg.contains("Failed to parse run config YAML"))
            }
            other => panic!("Expected ConfigError for unknown field, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_pacing_strategy_is_rejected() {
        let temp_file = create_temp_config_file("pacing:\n  strategy: leaky_bucket\n");
        assert!(matches!(
            load_run_config(temp_file.path()),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let config = RunConfig {
            pacing: PacingConfig::TokenBucket {
                requests_per_second: 0.0,
                burst_size: 1,
            },
            ..Default::default()
        };
        match config.validate() {
            Err(PipelineError::ConfigValidationError(msg)) => {
                assert!(msg.contains("requests_per_second"))
            }
            other => panic!("Expected ConfigValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_zero_burst() {
        let pacing = PacingConfig::TokenBucket {
            requests_per_second: 1.0,
            burst_size: 0,
        };
        assert!(matches!(
            pacing.validate(),
            Err(PipelineError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_service_settings() {
        let mut service = ServiceConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(service.validate().is_err());

        service.base_url = "https://example.com".to_string();
        service.timeout_secs = 0;
        assert!(service.validate().is_err());

        service.timeout_secs = 10;
        service.model = "  ".to_string();
        assert!(service.validate().is_err());
    }
}
