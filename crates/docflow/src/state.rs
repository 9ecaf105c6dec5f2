//! Per-run state record and partial-update merge semantics.
//!
//! One `DocumentState` exists per run. Stages never touch the record
//! directly; each returns a `StateUpdate` naming only the fields it sets,
//! and the executor folds that into the record with `merged`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The accumulating record threaded through every stage of one run.
///
/// Created fresh per run with all optional fields at their zero value.
/// Runs share nothing: the record is owned by its run and handed back to
/// the caller when the run reaches a terminal edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    /// Unique identifier for this run's document.
    pub doc_id: String,
    /// Reference to the source bytes. Resolved once by ingest, read-only after.
    pub source_path: PathBuf,
    /// Raw document text. Empty string when the source is unreadable, never absent.
    #[serde(default)]
    pub content: String,
    /// Label assigned by classification; `None` until the classify stage runs.
    #[serde(default)]
    pub classification: Option<String>,
    /// Classification confidence in [0.0, 1.0]. 0.0 when unset.
    #[serde(default)]
    pub confidence_score: f32,
    /// Field name → value mapping produced by extraction.
    #[serde(default)]
    pub extracted_data: Map<String, Value>,
    /// Ordered, human-readable problem descriptions. Empty means no known problem.
    #[serde(default)]
    pub validation_errors: Vec<String>,
    /// Informational marker set by the manual-review stage; not consumed by the executor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

impl DocumentState {
    /// Creates the initial record for a run, all assignable fields at zero value.
    pub fn new(doc_id: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            doc_id: doc_id.into(),
            source_path: source_path.into(),
            content: String::new(),
            classification: None,
            confidence_score: 0.0,
            extracted_data: Map::new(),
            validation_errors: Vec::new(),
            next_step: None,
        }
    }

    /// Returns a new record with `update` folded in.
    ///
    /// Every field the update names overwrites the current value; fields the
    /// update leaves `None` are preserved unchanged. Total (never fails) and
    /// copy-on-write: the receiver is untouched, so intermediate states can
    /// be logged or inspected while the run advances.
    #[must_use]
    pub fn merged(&self, update: StateUpdate) -> DocumentState {
        let mut next = self.clone();
        if let Some(content) = update.content {
            next.content = content;
        }
        if let Some(classification) = update.classification {
            next.classification = Some(classification);
        }
        if let Some(confidence_score) = update.confidence_score {
            next.confidence_score = confidence_score;
        }
        if let Some(extracted_data) = update.extracted_data {
            next.extracted_data = extracted_data;
        }
        if let Some(validation_errors) = update.validation_errors {
            next.validation_errors = validation_errors;
        }
        if let Some(next_step) = update.next_step {
            next.next_step = Some(next_step);
        }
        next
    }
}

/// The subset of state fields a stage chooses to set.
///
/// A closed set of assignable fields rather than an open map: every stage
/// output shape is expressible here, and merge stays total by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub content: Option<String>,
    pub classification: Option<String>,
    pub confidence_score: Option<f32>,
    pub extracted_data: Option<Map<String, Value>>,
    pub validation_errors: Option<Vec<String>>,
    pub next_step: Option<String>,
}
