//! Workflow graph construction and compile-time validation.
//!
//! Build with `add_stage` / `add_edge` / `add_conditional_edges` /
//! `set_entry`, then `compile()` to obtain an executable [`Workflow`]. The
//! whole unrecognized-label error class is caught here, at build time:
//! routers declare the labels they can produce and `compile` demands an
//! exact match with the registered targets.

use std::collections::{HashMap, HashSet};

use crate::workflow::error::GraphError;
use crate::workflow::executor::Workflow;
use crate::workflow::node::{Stage, StageId};
use crate::workflow::router::{EdgeLabel, Router};

/// Where an edge leads: another stage, or the terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stage(StageId),
    End,
}

/// A stage's single outgoing edge kind.
pub(super) enum Edge {
    /// Followed unconditionally after the stage runs.
    Direct(Target),
    /// Router consulted after the stage's update is merged; its label picks the target.
    Conditional {
        router: Box<dyn Router>,
        targets: HashMap<EdgeLabel, Target>,
    },
}

/// Mutable graph under construction. Compile to run it.
#[derive(Default)]
pub struct WorkflowBuilder {
    stages: HashMap<StageId, Box<dyn Stage>>,
    edges: HashMap<StageId, Edge>,
    entry: Option<StageId>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stage under its own id. Replaces any previous registration.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) -> &mut Self {
        self.stages.insert(stage.id(), stage);
        self
    }

    /// Registers an unconditional edge out of `from`. Replaces any previous edge.
    pub fn add_edge(&mut self, from: StageId, to: Target) -> &mut Self {
        self.edges.insert(from, Edge::Direct(to));
        self
    }

    /// Registers a conditional edge set out of `from`, resolved by `router`.
    pub fn add_conditional_edges(
        &mut self,
        from: StageId,
        router: Box<dyn Router>,
        targets: impl IntoIterator<Item = (EdgeLabel, Target)>,
    ) -> &mut Self {
        self.edges.insert(
            from,
            Edge::Conditional {
                router,
                targets: targets.into_iter().collect(),
            },
        );
        self
    }

    /// Sets the stage a run starts from.
    pub fn set_entry(&mut self, entry: StageId) -> &mut Self {
        self.entry = Some(entry);
        self
    }

    /// Validates the topology and freezes it into an executable graph.
    ///
    /// Checks: an entry exists and is registered; every edge source and
    /// target is a registered stage; every registered stage has an outgoing
    /// edge; each router's declared label set matches its registered targets
    /// exactly, in both directions; the graph is acyclic.
    pub fn compile(self) -> Result<Workflow, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntry)?;
        if !self.stages.contains_key(&entry) {
            return Err(GraphError::UnknownStage(entry));
        }

        for (from, edge) in &self.edges {
            if !self.stages.contains_key(from) {
                return Err(GraphError::UnknownStage(*from));
            }
            match edge {
                Edge::Direct(target) => Self::check_target(&self.stages, *target)?,
                Edge::Conditional { router, targets } => {
                    for label in router.labels() {
                        match targets.get(label) {
                            Some(target) => Self::check_target(&self.stages, *target)?,
                            None => {
                                return Err(GraphError::UnroutedLabel {
                                    stage: *from,
                                    router: router.name(),
                                    label: *label,
                                })
                            }
                        }
                    }
                    for label in targets.keys() {
                        if !router.labels().contains(label) {
                            return Err(GraphError::UndeclaredLabel {
                                stage: *from,
                                router: router.name(),
                                label: *label,
                            });
                        }
                    }
                }
            }
        }

        for stage in self.stages.keys() {
            if !self.edges.contains_key(stage) {
                return Err(GraphError::MissingEdge(*stage));
            }
        }

        Self::check_acyclic(&self.edges, entry)?;

        Ok(Workflow {
            stages: self.stages,
            edges: self.edges,
            entry,
        })
    }

    fn check_target(
        stages: &HashMap<StageId, Box<dyn Stage>>,
        target: Target,
    ) -> Result<(), GraphError> {
        match target {
            Target::Stage(id) if !stages.contains_key(&id) => Err(GraphError::UnknownStage(id)),
            _ => Ok(()),
        }
    }

    /// Depth-first walk from the entry; a stage on the current path seen
    /// again means a cycle.
    fn check_acyclic(edges: &HashMap<StageId, Edge>, entry: StageId) -> Result<(), GraphError> {
        fn visit(
            edges: &HashMap<StageId, Edge>,
            node: StageId,
            path: &mut HashSet<StageId>,
            done: &mut HashSet<StageId>,
        ) -> Result<(), GraphError> {
            if done.contains(&node) {
                return Ok(());
            }
            if !path.insert(node) {
                return Err(GraphError::CycleDetected(node));
            }
            if let Some(edge) = edges.get(&node) {
                let successors: Vec<Target> = match edge {
                    Edge::Direct(target) => vec![*target],
                    Edge::Conditional { targets, .. } => targets.values().copied().collect(),
                };
                for target in successors {
                    if let Target::Stage(next) = target {
                        visit(edges, next, path, done)?;
                    }
                }
            }
            path.remove(&node);
            done.insert(node);
            Ok(())
        }

        let mut path = HashSet::new();
        let mut done = HashSet::new();
        visit(edges, entry, &mut path, &mut done)
    }
}
