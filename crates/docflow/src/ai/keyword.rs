//! Deterministic keyword/regex analyst.
//!
//! Offline backend used when no model service is configured, and by tests
//! that need reproducible collaborator behavior. Classification counts
//! keyword hits per document kind; extraction pulls fields with precompiled
//! regexes keyed to the classification.

use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::{
    AnalystError, Classification, Classifier, Extractor, LABEL_CONTRACT,
    LABEL_GENERAL_CORRESPONDENCE, LABEL_INVOICE, LABEL_OTHER, LABEL_TECHNICAL_SPEC,
};

struct KindPattern {
    label: &'static str,
    keywords: &'static [&'static str],
}

/// Known document kinds and the phrases that signal them.
const PATTERNS: &[KindPattern] = &[
    KindPattern {
        label: LABEL_INVOICE,
        keywords: &[
            "invoice",
            "invoice number",
            "amount due",
            "total due",
            "payment due",
            "bill to",
            "subtotal",
        ],
    },
    KindPattern {
        label: LABEL_CONTRACT,
        keywords: &[
            "contract",
            "agreement",
            "terms and conditions",
            "parties agree",
            "hereby agrees",
            "effective date",
        ],
    },
    KindPattern {
        label: LABEL_TECHNICAL_SPEC,
        keywords: &[
            "specification",
            "requirements",
            "architecture",
            "interface",
            "design document",
            "api",
        ],
    },
    KindPattern {
        label: LABEL_GENERAL_CORRESPONDENCE,
        keywords: &["dear", "regards", "sincerely", "best wishes", "thank you"],
    },
];

/// Confidence when no pattern matches at all.
const NO_MATCH_CONFIDENCE: f32 = 0.25;

/// Keyword/regex backend implementing both collaborator traits.
pub struct KeywordAnalyst {
    subtotal: Regex,
    tax: Regex,
    total_due: Regex,
    invoice_number: Regex,
    vendor: Regex,
    date: Regex,
    parties: Regex,
}

impl KeywordAnalyst {
    pub fn new() -> Self {
        // Patterns are fixed literals; compilation cannot fail.
        let compile = |pattern: &str| Regex::new(pattern).expect("fixed regex compiles");

        Self {
            subtotal: compile(r"(?i)\bsub\s*-?\s*total\b[^\d$€£-]*[$€£]?\s*(-?[\d,]+(?:\.\d+)?)"),
            tax: compile(r"(?i)\b(?:tax|vat|gst)\b[^\d$€£-]*[$€£]?\s*(-?[\d,]+(?:\.\d+)?)"),
            total_due: compile(
                r"(?i)\btotal(?:\s+(?:due|amount))?\b[^\d$€£-]*[$€£]?\s*(-?[\d,]+(?:\.\d+)?)",
            ),
            invoice_number: compile(r"(?i)\binvoice\s*(?:no|number|#)?[.:\s]*([A-Z0-9][A-Z0-9-]{2,})"),
            vendor: compile(r"(?im)^\s*(?:from|vendor|issued by)[:\s]+(.+?)\s*$"),
            date: compile(r"\b(\d{4}-\d{2}-\d{2})\b"),
            parties: compile(r"(?i)\bbetween\s+(.+?)\s+and\s+(.+?)(?:[,.\n]|$)"),
        }
    }

    fn capture_text(&self, pattern: &Regex, text: &str) -> Option<String> {
        pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn capture_amount(&self, pattern: &Regex, text: &str) -> Option<f64> {
        self.capture_text(pattern, text)
            .and_then(|raw| raw.replace(',', "").parse::<f64>().ok())
    }

    fn insert_amount(map: &mut Map<String, Value>, key: &str, amount: Option<f64>) {
        if let Some(number) = amount.and_then(Number::from_f64) {
            map.insert(key.to_string(), Value::Number(number));
        }
    }
}

impl Default for KeywordAnalyst {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for KeywordAnalyst {
    fn classify(&self, text: &str) -> Result<Classification, AnalystError> {
        let lower = text.to_lowercase();

        let best = PATTERNS
            .iter()
            .map(|pattern| {
                let hits = pattern
                    .keywords
                    .iter()
                    .filter(|keyword| lower.contains(*keyword))
                    .count();
                (pattern.label, hits)
            })
            .max_by_key(|(_, hits)| *hits)
            .unwrap_or((LABEL_OTHER, 0));

        let (label, hits) = best;
        if hits == 0 {
            debug!("no keyword pattern matched");
            return Ok(Classification {
                label: LABEL_OTHER.to_string(),
                confidence: NO_MATCH_CONFIDENCE,
            });
        }

        // One hit is a weak signal; each further hit raises confidence.
        let confidence = (0.35 + 0.15 * hits as f32).min(0.95);
        debug!(label, hits, confidence, "keyword classification");

        Ok(Classification {
            label: label.to_string(),
            confidence,
        })
    }
}

impl Extractor for KeywordAnalyst {
    fn extract(
        &self,
        text: &str,
        classification: &str,
    ) -> Result<Map<String, Value>, AnalystError> {
        let mut fields = Map::new();

        match classification {
            LABEL_INVOICE => {
                Self::insert_amount(&mut fields, "subtotal", self.capture_amount(&self.subtotal, text));
                Self::insert_amount(&mut fields, "tax", self.capture_amount(&self.tax, text));
                Self::insert_amount(
                    &mut fields,
                    "total_due",
                    self.capture_amount(&self.total_due, text),
                );
                if let Some(number) = self.capture_text(&self.invoice_number, text) {
                    fields.insert("invoice_number".to_string(), Value::String(number));
                }
                if let Some(vendor) = self.capture_text(&self.vendor, text) {
                    fields.insert("vendor".to_string(), Value::String(vendor));
                }
                if let Some(date) = self.capture_text(&self.date, text) {
                    fields.insert("date".to_string(), Value::String(date));
                }
            }
            LABEL_CONTRACT => {
                if let Some(captures) = self.parties.captures(text) {
                    if let (Some(a), Some(b)) = (captures.get(1), captures.get(2)) {
                        fields.insert(
                            "party_a".to_string(),
                            Value::String(a.as_str().trim().to_string()),
                        );
                        fields.insert(
                            "party_b".to_string(),
                            Value::String(b.as_str().trim().to_string()),
                        );
                    }
                }
                if let Some(date) = self.capture_text(&self.date, text) {
                    fields.insert("effective_date".to_string(), Value::String(date));
                }
            }
            _ => {
                if let Some(date) = self.capture_text(&self.date, text) {
                    fields.insert("date".to_string(), Value::String(date));
                }
            }
        }

        Ok(fields)
    }
}
