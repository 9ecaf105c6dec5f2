use std::path::{Path, PathBuf};

use crate::state::DocumentState;

/// One queued unit of work: a document to run through the workflow.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub doc_id: String,
    pub source_path: PathBuf,
    /// Name of the import source that discovered this document (if any).
    pub source_name: Option<String>,
    /// MIME type of the source file (e.g. "text/plain").
    pub mime_type: Option<String>,
}

impl RunRequest {
    fn new_internal(source_path: PathBuf, source_name: Option<String>) -> Self {
        let mime_type = Self::detect_mime_type(&source_path);
        Self {
            doc_id: uuid::Uuid::new_v4().to_string(),
            source_path,
            source_name,
            mime_type,
        }
    }

    /// Creates a request with a generated doc id.
    pub fn new(source_path: PathBuf) -> Self {
        Self::new_internal(source_path, None)
    }

    /// Creates a request tagged with the source that discovered it.
    pub fn with_source(source_path: PathBuf, source_name: String) -> Self {
        Self::new_internal(source_path, Some(source_name))
    }

    /// The source file name, for display and store records.
    pub fn filename(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn detect_mime_type(path: &Path) -> Option<String> {
        mime_guess::from_path(path).first().map(|m| m.to_string())
    }
}

/// What a worker hands back when a run finishes.
#[derive(Debug)]
pub struct RunOutcome {
    pub doc_id: String,
    pub source_path: PathBuf,
    pub success: bool,
    /// Final state record for successful runs.
    pub state: Option<DocumentState>,
    /// Whether the run ended in the manual-review stage.
    pub needs_review: bool,
    /// Fatal error description for failed runs.
    pub error: Option<String>,
}

impl RunOutcome {
    pub fn success(request: &RunRequest, state: DocumentState) -> Self {
        let needs_review = state.next_step.as_deref() == Some("manual_review");
        Self {
            doc_id: request.doc_id.clone(),
            source_path: request.source_path.clone(),
            success: true,
            state: Some(state),
            needs_review,
            error: None,
        }
    }

    pub fn failure(request: &RunRequest, error: String) -> Self {
        Self {
            doc_id: request.doc_id.clone(),
            source_path: request.source_path.clone(),
            success: false,
            state: None,
            needs_review: false,
            error: Some(error),
        }
    }
}
