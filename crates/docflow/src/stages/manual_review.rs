//! Manual-review stage: terminal escalation marker.

use tracing::warn;

use crate::state::{DocumentState, StateUpdate};
use crate::workflow::{Stage, StageId};

/// Error recorded when the run reaches review without an existing problem
/// description (the low-confidence branch).
pub const LOW_CONFIDENCE_ERROR: &str = "Document confidence too low";

/// Marks a run for human follow-up.
///
/// Guarantees the error list is non-empty once this stage has run, so
/// consumers can always distinguish reviewed runs. Performs no external
/// calls; a notification side effect can attach via the progress reporter
/// without changing the graph shape.
pub struct ManualReviewStage;

impl Stage for ManualReviewStage {
    fn id(&self) -> StageId {
        StageId::ManualReview
    }

    fn run(&self, state: &DocumentState) -> StateUpdate {
        warn!(
            confidence = state.confidence_score,
            "flagging document for manual review"
        );

        let validation_errors = if state.validation_errors.is_empty() {
            vec![LOW_CONFIDENCE_ERROR.to_string()]
        } else {
            state.validation_errors.clone()
        };

        StateUpdate {
            next_step: Some(StageId::ManualReview.as_str().to_string()),
            validation_errors: Some(validation_errors),
            ..Default::default()
        }
    }
}
