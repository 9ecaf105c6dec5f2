//! Stage implementations for the document workflow.

pub mod classify;
pub mod extract;
pub mod ingest;
pub mod manual_review;
pub mod validate;

pub use classify::ClassifyStage;
pub use extract::ExtractStage;
pub use ingest::IngestStage;
pub use manual_review::ManualReviewStage;
pub use validate::ValidateStage;

/// Collaborators receive at most this many characters of document text.
/// Very long documents classify and extract fine from their head.
pub(crate) const ANALYST_PREFIX_CHARS: usize = 3000;

/// First `max_chars` characters of `text`, cut on a char boundary.
pub(crate) fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
