use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Directory scanned for documents to process.
    pub input_directory: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub analyst: AnalystConfig,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

/// Which collaborator backend serves classification and extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum AnalystConfig {
    /// Deterministic local keyword/regex analyst.
    Keyword,
    /// Remote JSON service.
    Http {
        endpoint: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for AnalystConfig {
    fn default() -> Self {
        AnalystConfig::Keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyst_config_defaults_to_keyword() {
        assert!(matches!(AnalystConfig::default(), AnalystConfig::Keyword));
    }

    #[test]
    fn http_backend_deserializes_with_default_timeout() {
        let config: AnalystConfig =
            serde_json::from_str(r#"{"backend": "http", "endpoint": "http://localhost:9000"}"#)
                .unwrap();
        match config {
            AnalystConfig::Http {
                endpoint,
                timeout_secs,
            } => {
                assert_eq!(endpoint, "http://localhost:9000");
                assert_eq!(timeout_secs, 30);
            }
            _ => panic!("expected http backend"),
        }
    }
}
