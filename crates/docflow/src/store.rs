//! Run store: explicit owned status bookkeeping, keyed by doc id.
//!
//! Replaces any notion of process-global run state: whoever needs run status
//! holds a reference to this store. In-memory only; retaining history beyond
//! the final state is the caller's concern.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::RunStatus;
use crate::state::DocumentState;

/// Status record for one run, kept from enqueue to completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRun {
    /// Unique run identifier.
    pub doc_id: String,
    /// Original filename being processed.
    pub filename: String,
    /// Current status.
    pub status: RunStatus,
    /// When the run was enqueued.
    pub started_at: DateTime<Utc>,
    /// When the run finished (if it has).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Final state record (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_state: Option<DocumentState>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Thread-safe map of run records.
///
/// Writes degrade silently if the lock is poisoned; a poisoned store means a
/// worker panicked and the process is already on its way down.
#[derive(Default)]
pub struct RunStore {
    runs: RwLock<HashMap<String, StoredRun>>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly enqueued run.
    pub fn mark_queued(&self, doc_id: &str, filename: &str) {
        if let Ok(mut runs) = self.runs.write() {
            runs.insert(
                doc_id.to_string(),
                StoredRun {
                    doc_id: doc_id.to_string(),
                    filename: filename.to_string(),
                    status: RunStatus::Queued,
                    started_at: Utc::now(),
                    completed_at: None,
                    final_state: None,
                    error: None,
                },
            );
        }
    }

    /// Marks a run as picked up by a worker.
    pub fn mark_processing(&self, doc_id: &str) {
        if let Ok(mut runs) = self.runs.write() {
            if let Some(run) = runs.get_mut(doc_id) {
                run.status = RunStatus::Processing;
            }
        }
    }

    /// Records a normally terminated run with its final state.
    pub fn complete(&self, doc_id: &str, state: DocumentState) {
        if let Ok(mut runs) = self.runs.write() {
            if let Some(run) = runs.get_mut(doc_id) {
                run.status = RunStatus::Completed;
                run.completed_at = Some(Utc::now());
                run.final_state = Some(state);
            }
        }
    }

    /// Records a fatally failed run.
    pub fn fail(&self, doc_id: &str, error: &str) {
        if let Ok(mut runs) = self.runs.write() {
            if let Some(run) = runs.get_mut(doc_id) {
                run.status = RunStatus::Failed;
                run.completed_at = Some(Utc::now());
                run.error = Some(error.to_string());
            }
        }
    }

    pub fn get(&self, doc_id: &str) -> Option<StoredRun> {
        self.runs
            .read()
            .ok()
            .and_then(|runs| runs.get(doc_id).cloned())
    }

    /// All known runs, most recently enqueued first.
    pub fn all(&self) -> Vec<StoredRun> {
        let mut runs: Vec<StoredRun> = self
            .runs
            .read()
            .map(|runs| runs.values().cloned().collect())
            .unwrap_or_default();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs
    }

    pub fn len(&self) -> usize {
        self.runs.read().map(|runs| runs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_advances_through_statuses() {
        let store = RunStore::new();
        store.mark_queued("doc-1", "invoice.txt");
        assert_eq!(store.get("doc-1").unwrap().status, RunStatus::Queued);

        store.mark_processing("doc-1");
        assert_eq!(store.get("doc-1").unwrap().status, RunStatus::Processing);

        store.complete("doc-1", DocumentState::new("doc-1", "/tmp/invoice.txt"));
        let run = store.get("doc-1").unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.completed_at.is_some());
        assert!(run.final_state.is_some());
    }

    #[test]
    fn failure_records_the_error() {
        let store = RunStore::new();
        store.mark_queued("doc-1", "doc.txt");
        store.fail("doc-1", "router misconfigured");

        let run = store.get("doc-1").unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("router misconfigured"));
        assert!(run.final_state.is_none());
    }

    #[test]
    fn unknown_doc_id_is_none() {
        let store = RunStore::new();
        assert!(store.get("missing").is_none());
        store.mark_processing("missing");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn all_lists_every_run() {
        let store = RunStore::new();
        store.mark_queued("a", "a.txt");
        store.mark_queued("b", "b.txt");
        assert_eq!(store.len(), 2);
        assert_eq!(store.all().len(), 2);
    }
}
