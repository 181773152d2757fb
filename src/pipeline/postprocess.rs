//! Post-processing: turn the model's raw text into question records.
//!
//! Two deterministic steps, independent of the HTTP layer:
//!
//! 1. [`strip_code_fence`] removes a Markdown code fence around the JSON.
//!    Precedence: a fence labelled `json` wins over an unlabelled fence,
//!    which wins over the raw text.
//! 2. [`parse_questions`] parses what remains as a JSON array.
//!
//! Elements are not validated: every element of the array is kept, whatever
//! its shape. There is no partial recovery either. If the text is not an
//! array the whole answer is rejected.

use crate::output::ExtractedQuestion;
use once_cell::sync::Lazy;
use regex::Regex;

// Text after the first "```json" up to the next fence, or to the end when
// the closing fence is missing.
static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json(.*?)(?:```|\z)").unwrap());

static RE_BARE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)(?:```|\z)").unwrap());

/// Strip a surrounding code fence from model output.
///
/// Only the first fenced block is kept; surrounding prose is dropped. The
/// label match is case-sensitive, so ```` ```JSON ```` is treated as an
/// unlabelled fence and the label stays in the text.
pub fn strip_code_fence(content: &str) -> &str {
    if let Some(inner) = RE_JSON_FENCE.captures(content).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }
    if let Some(inner) = RE_BARE_FENCE.captures(content).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }
    content
}

/// Parse fence-stripped model output as an array of questions.
pub fn parse_questions(text: &str) -> serde_json::Result<Vec<ExtractedQuestion>> {
    serde_json::from_str(text)
}
