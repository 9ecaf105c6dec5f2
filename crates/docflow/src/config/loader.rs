use std::path::Path;

use crate::config::schema::{AnalystConfig, Config};
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.input_directory.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "input_directory must not be empty".to_string(),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "worker_count must be at least 1".to_string(),
        });
    }

    if let AnalystConfig::Http { endpoint, .. } = &config.analyst {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Validation {
                message: format!("analyst endpoint must be an http(s) URL: {}", endpoint),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_loads_with_defaults() {
        let config = load_config_from_str(
            r#"{"version": "1.0", "input_directory": "/var/docs/in"}"#,
        )
        .unwrap();
        assert_eq!(config.input_directory, "/var/docs/in");
        assert!(config.worker_count >= 1);
        assert!(matches!(config.analyst, AnalystConfig::Keyword));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let result = load_config_from_str(
            r#"{"version": "2.0", "input_directory": "/var/docs/in"}"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let result = load_config_from_str(
            r#"{"version": "1.0", "input_directory": "/in", "worker_count": 0}"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        let result = load_config_from_str(
            r#"{
                "version": "1.0",
                "input_directory": "/in",
                "analyst": {"backend": "http", "endpoint": "ftp://wrong"}
            }"#,
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn malformed_json_maps_to_parse_error() {
        let result = load_config_from_str("{not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    fn missing_file_maps_to_read_error() {
        let result = load_config("/nonexistent/docflow.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
