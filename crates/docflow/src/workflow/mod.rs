//! Workflow graph: stages, routers, compile-time validation, execution.
//!
//! Build a topology with [`WorkflowBuilder`], compile it into a [`Workflow`],
//! and drive runs through [`WorkflowEngine`]. The document intake topology
//! itself is fixed and built by [`document_workflow`].

mod engine;
mod error;
mod executor;
mod graph;
mod node;
mod router;

pub use engine::{document_workflow, WorkflowEngine};
pub use error::GraphError;
pub use executor::Workflow;
pub use graph::{Target, WorkflowBuilder};
pub use node::{Stage, StageId};
pub use router::{
    ConfidenceRouter, EdgeLabel, Router, ValidationRouter, CONFIDENCE_THRESHOLD,
};
