//! Ingest stage: resolve the source reference and read its text.

use tracing::{info, warn};

use crate::state::{DocumentState, StateUpdate};
use crate::workflow::{Stage, StageId};

/// Reads the run's source file as UTF-8 text.
///
/// A missing or unreadable source is a soft failure: the stage records empty
/// content and the run continues, with downstream stages treating the empty
/// text as "no signal".
pub struct IngestStage;

impl Stage for IngestStage {
    fn id(&self) -> StageId {
        StageId::Ingest
    }

    fn run(&self, state: &DocumentState) -> StateUpdate {
        let content = match std::fs::read_to_string(&state.source_path) {
            Ok(content) => {
                info!(chars = content.chars().count(), "read source text");
                content
            }
            Err(error) => {
                warn!(
                    path = %state.source_path.display(),
                    %error,
                    "source unreadable, continuing with empty content"
                );
                String::new()
            }
        };

        StateUpdate {
            content: Some(content),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_source_text() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Invoice total due: $100.00").unwrap();

        let state = DocumentState::new("doc", file.path());
        let update = IngestStage.run(&state);
        assert_eq!(
            update.content.as_deref(),
            Some("Invoice total due: $100.00")
        );
    }

    #[test]
    fn missing_source_yields_empty_content() {
        let state = DocumentState::new("doc", "/nonexistent/path/doc.txt");
        let update = IngestStage.run(&state);
        assert_eq!(update.content.as_deref(), Some(""));
    }

    #[test]
    fn only_content_is_touched() {
        let state = DocumentState::new("doc", "/nonexistent/path/doc.txt");
        let update = IngestStage.run(&state);
        assert!(update.classification.is_none());
        assert!(update.validation_errors.is_none());
    }
}
