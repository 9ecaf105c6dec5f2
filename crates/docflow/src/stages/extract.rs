//! Extract stage: adapter over the extraction collaborator.

use std::sync::Arc;

use serde_json::Map;
use tracing::{info, warn};

use crate::ai::{Extractor, LABEL_UNKNOWN};
use crate::stages::{char_prefix, ANALYST_PREFIX_CHARS};
use crate::state::{DocumentState, StateUpdate};
use crate::workflow::{Stage, StageId};

pub struct ExtractStage {
    analyst: Arc<dyn Extractor>,
}

impl ExtractStage {
    pub fn new(analyst: Arc<dyn Extractor>) -> Self {
        Self { analyst }
    }
}

impl Stage for ExtractStage {
    fn id(&self) -> StageId {
        StageId::Extract
    }

    fn run(&self, state: &DocumentState) -> StateUpdate {
        let classification = state.classification.as_deref().unwrap_or(LABEL_UNKNOWN);
        let prefix = char_prefix(&state.content, ANALYST_PREFIX_CHARS);

        let extracted = match self.analyst.extract(prefix, classification) {
            Ok(fields) => {
                info!(classification, fields = fields.len(), "extraction complete");
                fields
            }
            Err(error) => {
                warn!(%error, "extraction failed, substituting empty field map");
                Map::new()
            }
        };

        StateUpdate {
            extracted_data: Some(extracted),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use crate::ai::AnalystError;

    struct ScriptedExtractor {
        fields: Result<Map<String, Value>, ()>,
    }

    impl Extractor for ScriptedExtractor {
        fn extract(
            &self,
            _text: &str,
            _classification: &str,
        ) -> Result<Map<String, Value>, AnalystError> {
            match &self.fields {
                Ok(map) => Ok(map.clone()),
                Err(()) => Err(AnalystError::ResponseParse("garbage".to_string())),
            }
        }
    }

    #[test]
    fn returns_the_collaborator_field_map() {
        let mut fields = Map::new();
        fields.insert("total_due".to_string(), json!(100.0));
        let stage = ExtractStage::new(Arc::new(ScriptedExtractor { fields: Ok(fields) }));

        let mut state = DocumentState::new("doc", "/tmp/doc.txt");
        state.content = "Invoice text".to_string();
        state.classification = Some("Invoice".to_string());

        let update = stage.run(&state);
        let extracted = update.extracted_data.unwrap();
        assert_eq!(extracted.get("total_due"), Some(&json!(100.0)));
    }

    #[test]
    fn malformed_output_falls_back_to_empty_map() {
        let stage = ExtractStage::new(Arc::new(ScriptedExtractor { fields: Err(()) }));
        let mut state = DocumentState::new("doc", "/tmp/doc.txt");
        state.classification = Some("Invoice".to_string());

        let update = stage.run(&state);
        assert_eq!(update.extracted_data, Some(Map::new()));
    }
}
