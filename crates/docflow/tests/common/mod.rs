//! Shared harness for workflow integration tests.
//!
//! Provides scripted collaborators with deterministic answers, a progress
//! recorder for asserting the path a run took, and tempdir fixtures.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tempfile::TempDir;

use docflow::{
    AnalystError, Classification, Classifier, Extractor, ProgressEvent, ProgressReporter,
    RunPhase, WorkflowEngine,
};

/// Collaborator double answering from a fixed script.
pub struct ScriptedAnalyst {
    pub label: String,
    pub confidence: f32,
    pub fields: Map<String, Value>,
    pub fail_classify: bool,
    pub fail_extract: bool,
}

impl Default for ScriptedAnalyst {
    fn default() -> Self {
        Self {
            label: "Invoice".to_string(),
            confidence: 0.95,
            fields: Map::new(),
            fail_classify: false,
            fail_extract: false,
        }
    }
}

impl ScriptedAnalyst {
    pub fn classifying(label: &str, confidence: f32) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            ..Default::default()
        }
    }

    pub fn with_fields(mut self, fields: &[(&str, Value)]) -> Self {
        self.fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self
    }
}

impl Classifier for ScriptedAnalyst {
    fn classify(&self, _text: &str) -> Result<Classification, AnalystError> {
        if self.fail_classify {
            return Err(AnalystError::ResponseParse("scripted failure".to_string()));
        }
        Ok(Classification {
            label: self.label.clone(),
            confidence: self.confidence,
        })
    }
}

impl Extractor for ScriptedAnalyst {
    fn extract(
        &self,
        _text: &str,
        _classification: &str,
    ) -> Result<Map<String, Value>, AnalystError> {
        if self.fail_extract {
            return Err(AnalystError::ResponseParse("scripted failure".to_string()));
        }
        Ok(self.fields.clone())
    }
}

/// Progress reporter that records every event for path assertions.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence of stage phases the run passed through.
    pub fn phases(&self) -> Vec<RunPhase> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Phase { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn review_requests(&self) -> Vec<(Vec<String>, f32)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::ReviewRequested {
                    validation_errors,
                    confidence_score,
                    ..
                } => Some((validation_errors.clone(), *confidence_score)),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|event| matches!(event, ProgressEvent::Completed { .. }))
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Writes a document fixture and returns its path.
pub fn write_doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).expect("write fixture");
    path
}

/// Engine wired to one scripted analyst for both collaborator roles.
pub fn engine_with(analyst: ScriptedAnalyst) -> WorkflowEngine {
    let analyst = Arc::new(analyst);
    WorkflowEngine::new(analyst.clone(), analyst).expect("fixed topology compiles")
}
