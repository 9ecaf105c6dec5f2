//! Document intake workflow engine.
//!
//! One run per document: ingest the text, classify it, extract fields,
//! validate them, and escalate anything ambiguous to manual review. The
//! topology is a fixed directed graph executed against an accumulating
//! [`DocumentState`] record; routing is driven by classification confidence
//! and a deterministic data-consistency rule.

pub mod ai;
pub mod config;
pub mod error;
pub mod progress;
pub mod stages;
pub mod state;
pub mod store;
pub mod worker;
pub mod workflow;

pub use ai::{AnalystError, Classification, Classifier, Extractor, HttpAnalyst, KeywordAnalyst};
pub use config::{load_config, AnalystConfig, Config};
pub use error::{ConfigError, DocflowError, Result, WorkerError};
pub use progress::{
    BroadcastProgress, NoopProgress, ProgressEvent, ProgressReporter, RunPhase,
    RunProgressEvent, RunStatus,
};
pub use state::{DocumentState, StateUpdate};
pub use store::{RunStore, StoredRun};
pub use worker::{DirectoryScanner, RunOutcome, RunRequest, WorkerPool};
pub use workflow::{
    document_workflow, EdgeLabel, GraphError, Router, Stage, StageId, Workflow,
    WorkflowBuilder, WorkflowEngine, CONFIDENCE_THRESHOLD,
};
