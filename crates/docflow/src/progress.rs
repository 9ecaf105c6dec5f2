//! Run progress reporting for live status streaming.
//!
//! The executor reports phase transitions and terminal outcomes through a
//! [`ProgressReporter`]; consumers that want a live feed subscribe to the
//! broadcast channel behind [`BroadcastProgress`]. The manual-review handoff
//! is a distinct event so a review sink can attach without touching the
//! graph shape.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::workflow::StageId;

/// Phase of run processing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Queued,
    Ingesting,
    Classifying,
    Extracting,
    Validating,
    ManualReview,
    Completed,
    Failed,
}

impl RunPhase {
    pub fn for_stage(stage: StageId) -> Self {
        match stage {
            StageId::Ingest => RunPhase::Ingesting,
            StageId::Classify => RunPhase::Classifying,
            StageId::Extract => RunPhase::Extracting,
            StageId::Validate => RunPhase::Validating,
            StageId::ManualReview => RunPhase::ManualReview,
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Queued => write!(f, "Queued"),
            RunPhase::Ingesting => write!(f, "Ingesting"),
            RunPhase::Classifying => write!(f, "Classifying"),
            RunPhase::Extracting => write!(f, "Extracting"),
            RunPhase::Validating => write!(f, "Validating"),
            RunPhase::ManualReview => write!(f, "Manual review"),
            RunPhase::Completed => write!(f, "Completed"),
            RunPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Status of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Events emitted while a run advances through the graph.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Phase {
        phase: RunPhase,
        message: String,
    },
    /// The run reached manual review; payload for a human follow-up sink.
    ReviewRequested {
        doc_id: String,
        validation_errors: Vec<String>,
        confidence_score: f32,
    },
    Completed {
        classification: Option<String>,
        validation_errors: Vec<String>,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests and callers that don't stream.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Serialized progress record sent over the broadcast channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProgressEvent {
    /// Unique run identifier.
    pub doc_id: String,
    /// Original filename being processed.
    pub filename: String,
    /// Current phase of processing.
    pub phase: RunPhase,
    /// Overall run status.
    pub status: RunStatus,
    /// Human-readable message describing current activity.
    pub message: String,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
    /// Final classification (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Validation errors (set on completion and review handoff).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    /// Classification confidence (set on review handoff).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f32>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunProgressEvent {
    fn new(doc_id: &str, filename: &str, phase: RunPhase, message: &str) -> Self {
        let status = match phase {
            RunPhase::Queued => RunStatus::Queued,
            RunPhase::Completed => RunStatus::Completed,
            RunPhase::Failed => RunStatus::Failed,
            _ => RunStatus::Processing,
        };

        Self {
            doc_id: doc_id.to_string(),
            filename: filename.to_string(),
            phase,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            classification: None,
            validation_errors: Vec::new(),
            confidence_score: None,
            error: None,
        }
    }
}

/// Bridges executor progress events to a broadcast channel.
///
/// Send failures are ignored: a broadcast channel with no subscribers is a
/// normal condition, not an error.
pub struct BroadcastProgress {
    doc_id: String,
    filename: String,
    sender: Arc<broadcast::Sender<RunProgressEvent>>,
}

impl BroadcastProgress {
    pub fn new(
        doc_id: &str,
        filename: &str,
        sender: Arc<broadcast::Sender<RunProgressEvent>>,
    ) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            filename: filename.to_string(),
            sender,
        }
    }

    fn send(&self, event: RunProgressEvent) {
        let _ = self.sender.send(event);
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                self.send(RunProgressEvent::new(
                    &self.doc_id,
                    &self.filename,
                    phase,
                    &message,
                ));
            }
            ProgressEvent::ReviewRequested {
                doc_id,
                validation_errors,
                confidence_score,
            } => {
                let mut event = RunProgressEvent::new(
                    &doc_id,
                    &self.filename,
                    RunPhase::ManualReview,
                    "Queued for human review",
                );
                event.validation_errors = validation_errors;
                event.confidence_score = Some(confidence_score);
                self.send(event);
            }
            ProgressEvent::Completed {
                classification,
                validation_errors,
            } => {
                let mut event = RunProgressEvent::new(
                    &self.doc_id,
                    &self.filename,
                    RunPhase::Completed,
                    "Run finished",
                );
                event.classification = classification;
                event.validation_errors = validation_errors;
                self.send(event);
            }
            ProgressEvent::Failed { error } => {
                let mut event = RunProgressEvent::new(
                    &self.doc_id,
                    &self.filename,
                    RunPhase::Failed,
                    "Run failed",
                );
                event.error = Some(error);
                self.send(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_maps_to_status() {
        let event = RunProgressEvent::new("d", "f.txt", RunPhase::Classifying, "working");
        assert_eq!(event.status, RunStatus::Processing);

        let event = RunProgressEvent::new("d", "f.txt", RunPhase::Completed, "done");
        assert_eq!(event.status, RunStatus::Completed);

        let event = RunProgressEvent::new("d", "f.txt", RunPhase::Failed, "boom");
        assert_eq!(event.status, RunStatus::Failed);
    }

    #[test]
    fn broadcast_progress_forwards_events() {
        let (tx, mut rx) = broadcast::channel(8);
        let progress = BroadcastProgress::new("doc-1", "doc.txt", Arc::new(tx));

        progress.report(ProgressEvent::Phase {
            phase: RunPhase::Ingesting,
            message: "Reading source text".to_string(),
        });
        progress.report(ProgressEvent::ReviewRequested {
            doc_id: "doc-1".to_string(),
            validation_errors: vec!["Document confidence too low".to_string()],
            confidence_score: 0.4,
        });

        let first = rx.try_recv().unwrap();
        assert_eq!(first.phase, RunPhase::Ingesting);
        assert_eq!(first.doc_id, "doc-1");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.phase, RunPhase::ManualReview);
        assert_eq!(second.confidence_score, Some(0.4));
        assert_eq!(
            second.validation_errors,
            vec!["Document confidence too low".to_string()]
        );
    }

    #[test]
    fn broadcast_without_subscribers_does_not_panic() {
        let (tx, _) = broadcast::channel(8);
        let progress = BroadcastProgress::new("doc-1", "doc.txt", Arc::new(tx));
        progress.report(ProgressEvent::Failed {
            error: "router misconfigured".to_string(),
        });
    }
}
