//! HTTP-backed analyst.
//!
//! Thin blocking JSON client for a remote classification/extraction service.
//! One request per call, fixed timeout, no retries: retry and queueing policy
//! belongs to the caller's dispatch layer, not the adapter.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{parse, AnalystError, Classification, Classifier, Extractor};

/// How much of a malformed response body to quote in errors.
const ERROR_SNIPPET_CHARS: usize = 200;

pub struct HttpAnalyst {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    text: &'a str,
    classification: &'a str,
}

impl HttpAnalyst {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AnalystError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalystError::Unavailable(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String, AnalystError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "analyst request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| AnalystError::Http(e.to_string()))?;

        response.text().map_err(|e| AnalystError::Http(e.to_string()))
    }

    fn snippet(body: &str) -> String {
        let mut snippet: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
        if body.chars().count() > ERROR_SNIPPET_CHARS {
            snippet.push_str("...");
        }
        snippet
    }
}

impl Classifier for HttpAnalyst {
    fn classify(&self, text: &str) -> Result<Classification, AnalystError> {
        let body = self.post("classify", &ClassifyRequest { text })?;
        parse::parse_classification(&body)
            .ok_or_else(|| AnalystError::ResponseParse(Self::snippet(&body)))
    }
}

impl Extractor for HttpAnalyst {
    fn extract(
        &self,
        text: &str,
        classification: &str,
    ) -> Result<Map<String, Value>, AnalystError> {
        let body = self.post(
            "extract",
            &ExtractRequest {
                text,
                classification,
            },
        )?;
        parse::parse_extraction(&body)
            .ok_or_else(|| AnalystError::ResponseParse(Self::snippet(&body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let analyst =
            HttpAnalyst::new("http://localhost:9000/", Duration::from_secs(5)).unwrap();
        assert_eq!(analyst.base_url, "http://localhost:9000");
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let body = "x".repeat(500);
        let snippet = HttpAnalyst::snippet(&body);
        assert!(snippet.ends_with("..."));
        assert!(snippet.chars().count() <= ERROR_SNIPPET_CHARS + 3);
    }
}
