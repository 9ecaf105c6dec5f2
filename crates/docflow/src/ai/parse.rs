//! Tolerant parsing of raw model output.
//!
//! Model-backed collaborators answer in JSON but routinely wrap it in
//! markdown code fences or stray prose. These helpers strip the wrapping and
//! accept minor shape drift (`confidence` vs `confidence_score`, flat maps
//! vs an `extracted_data` envelope). A `None` from any of them means the
//! caller substitutes its fallback; parsing never aborts a run.

use serde_json::{Map, Value};

use super::Classification;

/// Strips markdown code fences and parses the remainder as JSON.
pub fn clean_json(raw: &str) -> Option<Value> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim()).ok()
}

/// Parses a classification response: `{"classification": ..., "confidence": ...}`.
///
/// A missing confidence defaults to 0.0; out-of-range values are clamped
/// into [0.0, 1.0].
pub fn parse_classification(raw: &str) -> Option<Classification> {
    let value = clean_json(raw)?;
    let object = value.as_object()?;
    let label = object.get("classification")?.as_str()?.trim();
    if label.is_empty() {
        return None;
    }

    let confidence = object
        .get("confidence")
        .or_else(|| object.get("confidence_score"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);

    Some(Classification {
        label: label.to_string(),
        confidence: confidence as f32,
    })
}

/// Parses an extraction response into a field map.
///
/// Accepts either a flat object or one wrapped in an `extracted_data` key.
pub fn parse_extraction(raw: &str) -> Option<Map<String, Value>> {
    let value = clean_json(raw)?;
    let object = value.as_object()?;

    if let Some(inner) = object.get("extracted_data").and_then(Value::as_object) {
        return Some(inner.clone());
    }
    Some(object.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_json_strips_code_fences() {
        let raw = "```json\n{\"classification\": \"Invoice\", \"confidence\": 0.9}\n```";
        let value = clean_json(raw).unwrap();
        assert_eq!(value["classification"], json!("Invoice"));
    }

    #[test]
    fn clean_json_rejects_prose() {
        assert!(clean_json("I think this is an invoice.").is_none());
    }

    #[test]
    fn parse_classification_reads_both_confidence_keys() {
        let a = parse_classification(r#"{"classification": "Invoice", "confidence": 0.8}"#).unwrap();
        assert_eq!(a.label, "Invoice");
        assert_eq!(a.confidence, 0.8);

        let b =
            parse_classification(r#"{"classification": "Contract", "confidence_score": 0.6}"#)
                .unwrap();
        assert_eq!(b.confidence, 0.6);
    }

    #[test]
    fn parse_classification_defaults_and_clamps_confidence() {
        let missing = parse_classification(r#"{"classification": "Invoice"}"#).unwrap();
        assert_eq!(missing.confidence, 0.0);

        let high = parse_classification(r#"{"classification": "Invoice", "confidence": 3.2}"#)
            .unwrap();
        assert_eq!(high.confidence, 1.0);

        let low = parse_classification(r#"{"classification": "Invoice", "confidence": -1.0}"#)
            .unwrap();
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn parse_classification_rejects_malformed_shapes() {
        assert!(parse_classification("not json at all").is_none());
        assert!(parse_classification(r#"{"confidence": 0.9}"#).is_none());
        assert!(parse_classification(r#"{"classification": ""}"#).is_none());
        assert!(parse_classification(r#"[1, 2, 3]"#).is_none());
    }

    #[test]
    fn parse_extraction_accepts_flat_and_wrapped_maps() {
        let flat = parse_extraction(r#"{"total_due": 100.0, "vendor": "Acme"}"#).unwrap();
        assert_eq!(flat.get("vendor"), Some(&json!("Acme")));

        let wrapped =
            parse_extraction(r#"{"extracted_data": {"total_due": 100.0}}"#).unwrap();
        assert_eq!(wrapped.get("total_due"), Some(&json!(100.0)));
    }

    #[test]
    fn parse_extraction_rejects_non_objects() {
        assert!(parse_extraction(r#""just a string""#).is_none());
        assert!(parse_extraction("garbage").is_none());
    }
}
