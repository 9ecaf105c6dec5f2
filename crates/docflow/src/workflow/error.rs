//! Workflow graph errors.
//!
//! Everything here is the fatal misconfiguration class: a topology or
//! implementation bug, never bad input data. Bad input degrades to safe
//! defaults inside the stages instead.

use thiserror::Error;

use crate::workflow::node::StageId;
use crate::workflow::router::EdgeLabel;

#[derive(Debug, Error)]
pub enum GraphError {
    // Build-time validation
    #[error("no entry stage set")]
    MissingEntry,

    #[error("edge references unregistered stage '{0}'")]
    UnknownStage(StageId),

    #[error("stage '{0}' has no outgoing edge")]
    MissingEdge(StageId),

    #[error("router '{router}' can produce label '{label}' but stage '{stage}' registers no target for it")]
    UnroutedLabel {
        stage: StageId,
        router: &'static str,
        label: EdgeLabel,
    },

    #[error("stage '{stage}' registers label '{label}' that router '{router}' never produces")]
    UndeclaredLabel {
        stage: StageId,
        router: &'static str,
        label: EdgeLabel,
    },

    #[error("cycle detected through stage '{0}'")]
    CycleDetected(StageId),

    // Run-time backstops
    #[error("router '{router}' returned unregistered label '{label}' at stage '{stage}'")]
    UnregisteredLabel {
        stage: StageId,
        router: &'static str,
        label: EdgeLabel,
    },

    #[error("stage '{0}' visited twice in one run")]
    StageRevisited(StageId),
}
