//! Checkpoint persistence: progress that survives an interrupted run.
//!
//! The checkpoint sits next to the output file (`<output>.checkpoint`) and is
//! rewritten after every page. Two on-disk shapes are accepted:
//!
//! ```text
//! {"last_page": 23, "questions": [...]}   current  → resume at last_page
//! [...]                                   legacy   → keep questions, restart at start_page
//! ```
//!
//! The legacy shape carries no page counter, so a run that finds one starts
//! again from the configured start page. Pages already covered by the legacy
//! questions may be processed twice.
//!
//! Reading never fails the run: a missing file starts fresh silently, and an
//! unreadable or unrecognised one is logged and then treated as missing.

use crate::error::{CheckpointError, Pdf2QuizError};
use crate::output::{to_pretty_json, with_suffix, write_atomic, CheckpointOrigin, ExtractedQuestion};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Appended to the output path to name the checkpoint file.
pub const CHECKPOINT_SUFFIX: &str = ".checkpoint";

/// Checkpoint location for a given output file.
pub fn checkpoint_path(output_path: &Path) -> PathBuf {
    with_suffix(output_path, CHECKPOINT_SUFFIX)
}

/// Everything needed to resume: pages done so far and the questions found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Number of leading pages already processed; equivalently, the 0-based
    /// index of the next page to process.
    pub last_page: usize,
    #[serde(default)]
    pub questions: Vec<ExtractedQuestion>,
}

impl CheckpointState {
    /// Empty state positioned just before `start_page` (1-indexed).
    pub fn fresh(start_page: usize) -> Self {
        Self {
            last_page: start_page.saturating_sub(1),
            questions: Vec::new(),
        }
    }

    /// Decode checkpoint bytes in either accepted shape.
    pub fn from_json(
        bytes: &[u8],
        start_page: usize,
    ) -> serde_json::Result<(Self, CheckpointOrigin)> {
        // Dispatch on the JSON type first; deserialising the struct straight
        // from bytes would also accept its tuple form (`[5, []]`).
        match serde_json::from_slice::<Value>(bytes)? {
            value @ Value::Object(_) => {
                Ok((serde_json::from_value(value)?, CheckpointOrigin::Resumed))
            }
            value @ Value::Array(_) => Ok((
                Self {
                    questions: serde_json::from_value(value)?,
                    ..Self::fresh(start_page)
                },
                CheckpointOrigin::Legacy,
            )),
            other => Err(serde::de::Error::custom(format!(
                "expected an object or an array, found {other}"
            ))),
        }
    }

    /// Load the checkpoint at `path`, falling back to a fresh state.
    pub async fn load(path: &Path, start_page: usize) -> (Self, CheckpointOrigin) {
        match Self::try_load(path, start_page).await {
            Ok(Some((state, origin))) => {
                match origin {
                    CheckpointOrigin::Resumed => {
                        info!("Resuming from page {}", state.last_page + 1)
                    }
                    CheckpointOrigin::Legacy => info!(
                        "Legacy checkpoint found, {} questions recovered. Starting from page {}.",
                        state.questions.len(),
                        start_page
                    ),
                    CheckpointOrigin::Fresh => {}
                }
                (state, origin)
            }
            Ok(None) => {
                debug!("No checkpoint at {}", path.display());
                (Self::fresh(start_page), CheckpointOrigin::Fresh)
            }
            Err(e) => {
                warn!("Error loading checkpoint: {}. Starting fresh.", e);
                (Self::fresh(start_page), CheckpointOrigin::Fresh)
            }
        }
    }

    /// `Ok(None)` when no checkpoint file exists.
    async fn try_load(
        path: &Path,
        start_page: usize,
    ) -> Result<Option<(Self, CheckpointOrigin)>, CheckpointError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_json(&bytes, start_page)
            .map(Some)
            .map_err(|source| CheckpointError::Malformed {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Overwrite the checkpoint at `path` with this state.
    pub async fn save(&self, path: &Path) -> Result<(), Pdf2QuizError> {
        let bytes = to_pretty_json(self).map_err(|e| Pdf2QuizError::CheckpointWriteFailed {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        write_atomic(path, &bytes)
            .await
            .map_err(|source| Pdf2QuizError::CheckpointWriteFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(number: &str) -> ExtractedQuestion {
        serde_json::json!({
            "number": number,
            "question": format!("Question {number}?"),
            "answer": "B",
        })
        .into()
    }

    #[test]
    fn checkpoint_path_appends_suffix() {
        assert_eq!(
            checkpoint_path(Path::new("public/questions.json")),
            PathBuf::from("public/questions.json.checkpoint")
        );
    }

    #[test]
    fn fresh_state_sits_before_start_page() {
        assert_eq!(CheckpointState::fresh(19).last_page, 18);
        assert_eq!(CheckpointState::fresh(1).last_page, 0);
    }

    #[test]
    fn current_shape_resumes_at_last_page() {
        let json = r#"{"last_page": 23, "questions": [{"number": "7"}]}"#;
        let (state, origin) = CheckpointState::from_json(json.as_bytes(), 19).unwrap();
        assert_eq!(origin, CheckpointOrigin::Resumed);
        assert_eq!(state.last_page, 23);
        assert_eq!(state.questions[0].number(), "7");
    }

    #[test]
    fn current_shape_without_questions_defaults_to_empty() {
        let (state, _) = CheckpointState::from_json(br#"{"last_page": 4}"#, 1).unwrap();
        assert_eq!(state.last_page, 4);
        assert!(state.questions.is_empty());
    }

    #[test]
    fn legacy_shape_restarts_at_start_page_regardless_of_length() {
        let many: Vec<_> = (1..=40).map(|n| question(&n.to_string())).collect();
        let json = serde_json::to_vec(&many).unwrap();
        let (state, origin) = CheckpointState::from_json(&json, 19).unwrap();
        assert_eq!(origin, CheckpointOrigin::Legacy);
        assert_eq!(state.last_page, 18);
        assert_eq!(state.questions, many);
    }

    #[test]
    fn odd_shaped_saved_questions_still_resume() {
        let json = r#"{"last_page": 1, "questions": [
            {"number": "1", "justification": {"A": "a"}},
            {"number": "2", "justification": "single string"},
            {"number": "3", "options": ["A) x", "B) y"]},
            "stray"
        ]}"#;
        let (state, origin) = CheckpointState::from_json(json.as_bytes(), 1).unwrap();
        assert_eq!(origin, CheckpointOrigin::Resumed);
        assert_eq!(state.last_page, 1);
        assert_eq!(state.questions.len(), 4);
        assert_eq!(
            state.questions[1].justification().and_then(|j| j.as_str()),
            Some("single string")
        );
    }

    #[test]
    fn legacy_array_accepts_any_elements() {
        let (state, origin) = CheckpointState::from_json(b"[5, {\"number\": \"1\"}]", 3).unwrap();
        assert_eq!(origin, CheckpointOrigin::Legacy);
        assert_eq!(state.last_page, 2);
        assert_eq!(state.questions.len(), 2);
    }

    #[test]
    fn unrecognised_shapes_are_errors() {
        for json in [r#"{"questions": []}"#, "42", r#"{"last_page": -1}"#, "{"] {
            assert!(
                CheckpointState::from_json(json.as_bytes(), 1).is_err(),
                "accepted {json}"
            );
        }
    }

    #[tokio::test]
    async fn missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let (state, origin) = CheckpointState::load(&dir.path().join("none.checkpoint"), 5).await;
        assert_eq!(origin, CheckpointOrigin::Fresh);
        assert_eq!(state, CheckpointState::fresh(5));
    }

    #[tokio::test]
    async fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json.checkpoint");
        std::fs::write(&path, "{\"last_page\": 3, \"questions\": [").unwrap();
        let (state, origin) = CheckpointState::load(&path, 5).await;
        assert_eq!(origin, CheckpointOrigin::Fresh);
        assert_eq!(state, CheckpointState::fresh(5));
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json.checkpoint");
        let state = CheckpointState {
            last_page: 21,
            questions: vec![question("1"), question("2")],
        };
        state.save(&path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"last_page\": 21,"), "got: {text}");

        let (loaded, origin) = CheckpointState::load(&path, 19).await;
        assert_eq!(origin, CheckpointOrigin::Resumed);
        assert_eq!(loaded, state);
    }
}
