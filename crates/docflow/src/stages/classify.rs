//! Classify stage: adapter over the classification collaborator.

use std::sync::Arc;

use serde_json::Map;
use tracing::{debug, info, warn};

use crate::ai::{Classifier, LABEL_UNKNOWN};
use crate::stages::{char_prefix, ANALYST_PREFIX_CHARS};
use crate::state::{DocumentState, StateUpdate};
use crate::workflow::{Stage, StageId};

/// Content shorter than this is classified as Unknown without spending a
/// collaborator call.
pub const MIN_CONTENT_CHARS: usize = 5;

pub struct ClassifyStage {
    analyst: Arc<dyn Classifier>,
}

impl ClassifyStage {
    pub fn new(analyst: Arc<dyn Classifier>) -> Self {
        Self { analyst }
    }

    fn fallback() -> StateUpdate {
        StateUpdate {
            classification: Some(LABEL_UNKNOWN.to_string()),
            confidence_score: Some(0.0),
            extracted_data: Some(Map::new()),
            ..Default::default()
        }
    }
}

impl Stage for ClassifyStage {
    fn id(&self) -> StageId {
        StageId::Classify
    }

    fn run(&self, state: &DocumentState) -> StateUpdate {
        if state.content.chars().count() < MIN_CONTENT_CHARS {
            debug!("content too short, skipping collaborator call");
            return StateUpdate {
                classification: Some(LABEL_UNKNOWN.to_string()),
                confidence_score: Some(0.0),
                ..Default::default()
            };
        }

        let prefix = char_prefix(&state.content, ANALYST_PREFIX_CHARS);
        match self.analyst.classify(prefix) {
            Ok(result) => {
                info!(label = %result.label, confidence = result.confidence, "classified");
                StateUpdate {
                    classification: Some(result.label),
                    confidence_score: Some(result.confidence.clamp(0.0, 1.0)),
                    ..Default::default()
                }
            }
            Err(error) => {
                warn!(%error, "classification failed, substituting fallback");
                Self::fallback()
            }
        }
    }
}
