//! Validate stage: deterministic consistency checks on extracted data.

use serde_json::{Map, Value};
use tracing::debug;

use crate::ai::LABEL_INVOICE;
use crate::state::{DocumentState, StateUpdate};
use crate::workflow::{Stage, StageId};

/// Absolute tolerance for the invoice total check. Absorbs floating-point
/// rounding, not semantic error.
pub const TOTAL_TOLERANCE: f64 = 0.01;

/// Runs the data-consistency rules for the document's classification.
///
/// No external calls. Only invoices carry a numeric rule today; other
/// classifications pass as-is.
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn id(&self) -> StageId {
        StageId::Validate
    }

    fn run(&self, state: &DocumentState) -> StateUpdate {
        let errors = validate(state);
        debug!(errors = errors.len(), "validation finished");
        StateUpdate {
            validation_errors: Some(errors),
            ..Default::default()
        }
    }
}

fn validate(state: &DocumentState) -> Vec<String> {
    if state.extracted_data.is_empty() {
        return vec!["No data extracted".to_string()];
    }

    if state.classification.as_deref() == Some(LABEL_INVOICE) {
        return check_invoice_totals(&state.extracted_data);
    }

    Vec::new()
}

/// Checks `subtotal + tax == total_due` within [`TOTAL_TOLERANCE`].
fn check_invoice_totals(data: &Map<String, Value>) -> Vec<String> {
    let amounts = (
        coerce_amount(data.get("subtotal")),
        coerce_amount(data.get("tax")),
        coerce_amount(data.get("total_due")),
    );

    let (Some(subtotal), Some(tax), Some(total_due)) = amounts else {
        return vec!["Invalid number format in extracted data".to_string()];
    };

    let calculated_total = subtotal + tax;
    if (calculated_total - total_due).abs() > TOTAL_TOLERANCE {
        return vec![format!(
            "Invoice total mismatch: subtotal {} + tax {} = {}, but total_due is {}",
            subtotal, tax, calculated_total, total_due
        )];
    }

    Vec::new()
}

/// Coerces an extracted value to an amount.
///
/// Missing and null mean "not stated" and coerce to 0.0; numbers and numeric
/// strings (with optional currency sign and thousands separators) parse;
/// anything else is a coercion failure.
fn coerce_amount(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text
            .trim()
            .trim_start_matches(['$', '€', '£'])
            .trim_start()
            .replace(',', "")
            .parse()
            .ok(),
        Some(_) => None,
    }
}
