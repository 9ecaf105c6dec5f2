//! Collaborator boundary: classification and extraction backends.
//!
//! The workflow treats both services as opaque functions. Backends implement
//! [`Classifier`] and [`Extractor`]; the stage adapters own the fallback
//! discipline, so backend errors here are reported faithfully and never
//! abort a run.

pub mod http;
pub mod keyword;
pub mod parse;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AnalystConfig;

pub use http::HttpAnalyst;
pub use keyword::KeywordAnalyst;

/// Labels of the fixed classification taxonomy.
pub const LABEL_INVOICE: &str = "Invoice";
pub const LABEL_CONTRACT: &str = "Contract";
pub const LABEL_TECHNICAL_SPEC: &str = "Technical Spec";
pub const LABEL_GENERAL_CORRESPONDENCE: &str = "General_Correspondence";
pub const LABEL_OTHER: &str = "Other";
pub const LABEL_UNKNOWN: &str = "Unknown";

/// Errors a collaborator backend can report.
#[derive(Debug, Error)]
pub enum AnalystError {
    #[error("analyst request failed: {0}")]
    Http(String),

    #[error("failed to parse analyst response: {0}")]
    ResponseParse(String),

    #[error("analyst backend unavailable: {0}")]
    Unavailable(String),
}

/// Result of one classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Label drawn from the taxonomy, or free text the backend produced.
    pub label: String,
    /// Confidence in [0.0, 1.0].
    pub confidence: f32,
}

/// Assigns a taxonomy label and a confidence to document text.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, AnalystError>;
}

/// Pulls a field map appropriate to the classification out of document text.
pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        text: &str,
        classification: &str,
    ) -> Result<Map<String, Value>, AnalystError>;
}

/// Builds the classifier/extractor pair selected by configuration.
pub fn build_analyst(
    config: &AnalystConfig,
) -> Result<(Arc<dyn Classifier>, Arc<dyn Extractor>), AnalystError> {
    match config {
        AnalystConfig::Keyword => {
            let analyst = Arc::new(KeywordAnalyst::new());
            let classifier: Arc<dyn Classifier> = analyst.clone();
            let extractor: Arc<dyn Extractor> = analyst;
            Ok((classifier, extractor))
        }
        AnalystConfig::Http {
            endpoint,
            timeout_secs,
        } => {
            let analyst = Arc::new(HttpAnalyst::new(
                endpoint.clone(),
                Duration::from_secs(*timeout_secs),
            )?);
            let classifier: Arc<dyn Classifier> = analyst.clone();
            let extractor: Arc<dyn Extractor> = analyst;
            Ok((classifier, extractor))
        }
    }
}
