//! Compiled workflow: immutable topology, sequential execution.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info_span, warn};

use crate::progress::{ProgressEvent, ProgressReporter, RunPhase};
use crate::state::DocumentState;
use crate::workflow::error::GraphError;
use crate::workflow::graph::{Edge, Target};
use crate::workflow::node::{Stage, StageId};

/// Executable graph produced by `WorkflowBuilder::compile`.
///
/// Execution is strictly sequential within one run: invoke stage, merge its
/// partial update, follow the (possibly routed) outgoing edge, repeat until
/// a terminal edge. No fan-out, no cycles, each node at most once.
pub struct Workflow {
    pub(super) stages: HashMap<StageId, Box<dyn Stage>>,
    pub(super) edges: HashMap<StageId, Edge>,
    pub(super) entry: StageId,
}

impl Workflow {
    /// Runs the graph to completion over `initial` and returns the final record.
    ///
    /// The only error surface is the fatal misconfiguration class: a router
    /// returning an unregistered label, or a stage revisited. Bad input never
    /// errors here; stages fold it into the state as safe defaults.
    pub fn invoke(
        &self,
        initial: DocumentState,
        progress: &dyn ProgressReporter,
    ) -> Result<DocumentState, GraphError> {
        let run_span = info_span!("run", doc_id = %initial.doc_id);
        let _run_span = run_span.entered();

        let mut state = initial;
        let mut visited: HashSet<StageId> = HashSet::new();
        let mut current = self.entry;

        loop {
            if !visited.insert(current) {
                return Err(GraphError::StageRevisited(current));
            }

            // Compile guarantees every routed stage is registered.
            let stage = self
                .stages
                .get(&current)
                .expect("compiled graph contains every routed stage");

            progress.report(ProgressEvent::Phase {
                phase: RunPhase::for_stage(current),
                message: format!("Running {} stage", current),
            });

            let update = {
                let _stage_span = info_span!("stage", name = %current).entered();
                stage.run(&state)
            };
            state = state.merged(update);

            if current == StageId::ManualReview {
                warn!(
                    confidence = state.confidence_score,
                    errors = state.validation_errors.len(),
                    "document handed off to manual review"
                );
                progress.report(ProgressEvent::ReviewRequested {
                    doc_id: state.doc_id.clone(),
                    validation_errors: state.validation_errors.clone(),
                    confidence_score: state.confidence_score,
                });
            }

            let edge = self
                .edges
                .get(&current)
                .expect("compiled graph has an edge per stage");

            let target = match edge {
                Edge::Direct(target) => *target,
                Edge::Conditional { router, targets } => {
                    let label = router.route(&state);
                    debug!(router = router.name(), label = %label, "routed");
                    match targets.get(&label) {
                        Some(target) => *target,
                        None => {
                            return Err(GraphError::UnregisteredLabel {
                                stage: current,
                                router: router.name(),
                                label,
                            })
                        }
                    }
                }
            };

            match target {
                Target::End => break,
                Target::Stage(next) => current = next,
            }
        }

        progress.report(ProgressEvent::Completed {
            classification: state.classification.clone(),
            validation_errors: state.validation_errors.clone(),
        });
        Ok(state)
    }
}
