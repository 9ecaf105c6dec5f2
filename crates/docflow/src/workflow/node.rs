//! Stage identity and the stage contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{DocumentState, StateUpdate};

/// The fixed set of stages a workflow can contain.
///
/// An enum rather than free-form strings: edges reference stages by id, and
/// the builder validates every reference at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Ingest,
    Classify,
    Extract,
    Validate,
    ManualReview,
}

impl StageId {
    pub const fn as_str(self) -> &'static str {
        match self {
            StageId::Ingest => "ingest",
            StageId::Classify => "classify",
            StageId::Extract => "extract",
            StageId::Validate => "validate",
            StageId::ManualReview => "manual_review",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node in the workflow graph: full state in, partial update out.
///
/// Stages are infallible by contract. Anything that can go wrong inside a
/// stage (unreadable source, collaborator failure, malformed output) is
/// recorded in the returned update as a safe default, never raised, so the
/// executor always reaches a terminal edge.
pub trait Stage: Send + Sync {
    /// The id this stage is registered under.
    fn id(&self) -> StageId;

    /// Runs the stage against the current record and returns the fields it sets.
    fn run(&self, state: &DocumentState) -> StateUpdate;
}
