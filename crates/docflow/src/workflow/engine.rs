//! Run driver: the fixed document topology and its entry point.

use std::path::PathBuf;
use std::sync::Arc;

use crate::ai::{Classifier, Extractor};
use crate::progress::ProgressReporter;
use crate::stages::{ClassifyStage, ExtractStage, IngestStage, ManualReviewStage, ValidateStage};
use crate::state::DocumentState;
use crate::workflow::error::GraphError;
use crate::workflow::executor::Workflow;
use crate::workflow::graph::{Target, WorkflowBuilder};
use crate::workflow::node::StageId;
use crate::workflow::router::{ConfidenceRouter, EdgeLabel, ValidationRouter};

/// Builds the document intake topology:
///
/// ```text
/// ingest → classify → {extract | manual_review}
/// extract → validate → {manual_review | end}
/// manual_review → end
/// ```
pub fn document_workflow(
    classifier: Arc<dyn Classifier>,
    extractor: Arc<dyn Extractor>,
) -> Result<Workflow, GraphError> {
    let mut builder = WorkflowBuilder::new();

    builder.add_stage(Box::new(IngestStage));
    builder.add_stage(Box::new(ClassifyStage::new(classifier)));
    builder.add_stage(Box::new(ExtractStage::new(extractor)));
    builder.add_stage(Box::new(ValidateStage));
    builder.add_stage(Box::new(ManualReviewStage));

    builder.set_entry(StageId::Ingest);
    builder.add_edge(StageId::Ingest, Target::Stage(StageId::Classify));
    builder.add_conditional_edges(
        StageId::Classify,
        Box::new(ConfidenceRouter),
        [
            (EdgeLabel::Extract, Target::Stage(StageId::Extract)),
            (EdgeLabel::ManualReview, Target::Stage(StageId::ManualReview)),
        ],
    );
    builder.add_edge(StageId::Extract, Target::Stage(StageId::Validate));
    builder.add_conditional_edges(
        StageId::Validate,
        Box::new(ValidationRouter),
        [
            (EdgeLabel::ManualReview, Target::Stage(StageId::ManualReview)),
            (EdgeLabel::End, Target::End),
        ],
    );
    builder.add_edge(StageId::ManualReview, Target::End);

    builder.compile()
}

/// Entry point for one run: initial state in, final state out.
///
/// Holds the compiled graph; cheap to clone and share across worker threads.
/// Runs are isolated, so `process` takes `&self` with no locking.
#[derive(Clone)]
pub struct WorkflowEngine {
    workflow: Arc<Workflow>,
}

impl WorkflowEngine {
    /// Compiles the fixed topology around the given collaborators.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        extractor: Arc<dyn Extractor>,
    ) -> Result<Self, GraphError> {
        Ok(Self {
            workflow: Arc::new(document_workflow(classifier, extractor)?),
        })
    }

    /// Wraps an already-compiled workflow (custom wiring in tests).
    pub fn from_workflow(workflow: Arc<Workflow>) -> Self {
        Self { workflow }
    }

    /// Executes one run end-to-end and returns the final state record.
    ///
    /// Fails only on the fatal misconfiguration class; bad input always
    /// terminates normally with its problems recorded in the state.
    pub fn process(
        &self,
        doc_id: &str,
        source_path: impl Into<PathBuf>,
        progress: &dyn ProgressReporter,
    ) -> Result<DocumentState, GraphError> {
        let initial = DocumentState::new(doc_id, source_path);
        self.workflow.invoke(initial, progress)
    }
}
