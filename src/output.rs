//! Output types: the question record and the per-run summary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One question recovered from a page, kept exactly as the model wrote it.
///
/// The model is asked for objects with `number`, `question`, `options`,
/// `answer` and `justification`, but nothing is validated per element: any
/// JSON value in the returned array is kept and written back out unchanged,
/// with its keys in their original order. The accessors read the expected
/// fields leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedQuestion(Value);

impl ExtractedQuestion {
    /// Question number; numbers are rendered as text, missing or `null` is empty.
    pub fn number(&self) -> String {
        self.text("number")
    }

    pub fn question(&self) -> String {
        self.text("question")
    }

    /// Correct choice letter, as text.
    pub fn answer(&self) -> String {
        self.text("answer")
    }

    /// The `options` value in whatever shape the model used
    /// (usually a letter → text object).
    pub fn options(&self) -> Option<&Value> {
        self.get("options")
    }

    /// Text of option `letter` when `options` is a letter → text object.
    pub fn option(&self, letter: &str) -> Option<&str> {
        self.options()?.get(letter)?.as_str()
    }

    pub fn justification(&self) -> Option<&Value> {
        self.get("justification")
    }

    /// Any field by name; `None` when absent or when the element is not an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object()?.get(key)
    }

    /// `true` when the element is a JSON object.
    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Value> for ExtractedQuestion {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// How the run obtained its starting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointOrigin {
    /// No usable checkpoint; started at `start_page`.
    Fresh,
    /// `{last_page, questions}` checkpoint; resumed at `last_page`.
    Resumed,
    /// Bare-array checkpoint; questions kept, restarted at `start_page`.
    Legacy,
}

/// Statistics for a completed extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// 1-indexed page the run started at.
    pub first_page: usize,
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages rasterised and sent to the model during this run.
    pub pages_processed: usize,
    /// Of those, pages that contributed no questions (including failed calls).
    pub empty_pages: usize,
    /// Questions appended during this run.
    pub questions_added: usize,
    /// Questions in the final output file.
    pub total_questions: usize,
    pub checkpoint: CheckpointOrigin,
    pub duration_ms: u64,
}

/// Serialise `value` as pretty JSON with 4-space indentation.
///
/// Used for both the checkpoint and the final output so the two files are
/// formatted identically.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// `path` with `suffix` appended to the full file name
/// (`questions.json` + `.checkpoint` → `questions.json.checkpoint`).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Replace `path` with `bytes` via a sibling `.tmp` file and a rename, so a
/// reader never sees a half-written file.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = with_suffix(path, ".tmp");
    tokio::fs::write(&tmp_path, bytes).await?;
    tokio::fs::rename(&tmp_path, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> ExtractedQuestion {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn reads_well_formed_question() {
        let q = parse(
            r#"{"number":"1","question":"Q?","options":{"A":"x","B":"y"},"answer":"A","justification":{"A":"a","B":"b"}}"#,
        );
        assert_eq!(q.number(), "1");
        assert_eq!(q.question(), "Q?");
        assert_eq!(q.option("B"), Some("y"));
        assert_eq!(q.answer(), "A");
        assert_eq!(q.justification().unwrap()["A"], "a");
    }

    #[test]
    fn numeric_number_and_null_answer_read_as_text() {
        let q = parse(r#"{"number": 12, "question": "Q?", "answer": null}"#);
        assert_eq!(q.number(), "12");
        assert_eq!(q.answer(), "");
        assert!(q.options().is_none());
    }

    #[test]
    fn odd_shapes_are_kept_verbatim() {
        for text in [
            r#"{"number":"1","justification":"B is correct because it blocks traffic."}"#,
            r#"{"number":"2","options":["A) x","B) y"]}"#,
            r#"{"number":"3","options":{"A":"x","B":null}}"#,
            r#""not an object""#,
            "7",
        ] {
            let q = parse(text);
            let expected: Value = serde_json::from_str(text).unwrap();
            assert_eq!(q.as_value(), &expected);
            assert_eq!(serde_json::to_value(&q).unwrap(), expected);
        }
        assert_eq!(parse(r#"{"options":{"A":"x","B":null}}"#).option("B"), None);
        assert_eq!(parse("7").number(), "");
    }

    #[test]
    fn key_order_survives_a_rewrite() {
        let text = r#"{"question":"Q?","number":"4","options":{"C":"z","A":"x","B":"y"},"domain":"Governance"}"#;
        let q = parse(text);
        let back = serde_json::to_string(&q).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn pretty_json_uses_four_space_indent() {
        let out = to_pretty_json(&json!({"last_page": 1, "questions": []})).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "{\n    \"last_page\": 1,\n    \"questions\": []\n}");
    }

    #[test]
    fn suffix_is_appended_to_full_name() {
        assert_eq!(
            with_suffix(Path::new("out/questions.json"), ".checkpoint"),
            PathBuf::from("out/questions.json.checkpoint")
        );
    }

    #[tokio::test]
    async fn atomic_write_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"[]").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(!with_suffix(&path, ".tmp").exists());
    }
}
