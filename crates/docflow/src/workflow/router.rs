//! Routers: pure functions selecting among a node's conditional edges.

use std::fmt;

use crate::state::DocumentState;

/// Labels a router can return to select an outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeLabel {
    Extract,
    ManualReview,
    End,
}

impl EdgeLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            EdgeLabel::Extract => "extract",
            EdgeLabel::ManualReview => "manual_review",
            EdgeLabel::End => "end",
        }
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects one outgoing edge label from the current state.
///
/// `labels()` declares every label `route()` can produce, so the builder can
/// verify at compile time that each one has a registered successor. A router
/// must be pure: same state, same label.
pub trait Router: Send + Sync {
    /// Router name used in diagnostics and configuration errors.
    fn name(&self) -> &'static str;

    /// The complete set of labels `route` may return.
    fn labels(&self) -> &'static [EdgeLabel];

    /// Picks the edge to follow after the node's stage has merged its update.
    fn route(&self, state: &DocumentState) -> EdgeLabel;
}

/// Confidence below this routes a document to manual review instead of
/// extraction. Fixed: no hysteresis, no per-classification override.
pub const CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Post-classification routing on confidence alone.
pub struct ConfidenceRouter;

impl Router for ConfidenceRouter {
    fn name(&self) -> &'static str {
        "route_document"
    }

    fn labels(&self) -> &'static [EdgeLabel] {
        &[EdgeLabel::Extract, EdgeLabel::ManualReview]
    }

    fn route(&self, state: &DocumentState) -> EdgeLabel {
        if state.confidence_score < CONFIDENCE_THRESHOLD {
            EdgeLabel::ManualReview
        } else {
            EdgeLabel::Extract
        }
    }
}

/// Post-validation routing: any recorded problem escalates to manual review.
pub struct ValidationRouter;

impl Router for ValidationRouter {
    fn name(&self) -> &'static str {
        "route_validation"
    }

    fn labels(&self) -> &'static [EdgeLabel] {
        &[EdgeLabel::ManualReview, EdgeLabel::End]
    }

    fn route(&self, state: &DocumentState) -> EdgeLabel {
        if state.validation_errors.is_empty() {
            EdgeLabel::End
        } else {
            EdgeLabel::ManualReview
        }
    }
}
