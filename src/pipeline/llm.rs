//! VLM interaction: send one page image to a chat-completions endpoint and
//! turn the answer into questions.
//!
//! The prompt lives in [`crate::prompts`], and fence stripping and parsing
//! live in [`super::postprocess`]. This module only does the HTTP exchange
//! and the envelope handling.
//!
//! ## Failure policy
//!
//! A model call never fails the run. Any transport error, non-2xx status,
//! malformed envelope or unparsable answer is logged and the page
//! contributes zero questions. There is no retry and no backoff, and no
//! request timeout beyond the HTTP client's default.

use crate::config::ExtractionConfig;
use crate::error::{ModelError, Pdf2QuizError};
use crate::output::ExtractedQuestion;
use crate::pipeline::encode::png_data_uri;
use crate::pipeline::postprocess::{parse_questions, strip_code_fence};
use crate::prompts::EXTRACTION_PROMPT;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Anything that can read questions off a page image.
///
/// Implementations must not fail: a page the model cannot answer yields an
/// empty vector.
pub trait VisionModel {
    /// Extract the questions shown in a base64-encoded PNG.
    fn extract_questions(
        &self,
        image_base64: &str,
    ) -> impl Future<Output = Vec<ExtractedQuestion>> + Send;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────

/// Chat-completions client for a single vision model.
#[derive(Debug, Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ModelClient {
    /// Build a client from the endpoint, model and API key in `config`.
    pub fn new(config: &ExtractionConfig) -> Result<Self, Pdf2QuizError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Pdf2QuizError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Send one page and return its questions, or the reason it failed.
    ///
    /// An envelope without choices is a successful call that found nothing.
    pub async fn request_questions(
        &self,
        image_base64: &str,
    ) -> Result<Vec<ExtractedQuestion>, ModelError> {
        let body = request_body(&self.model, image_base64);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let content = match first_choice_content(&bytes)? {
            Some(content) => content,
            None => {
                debug!("Response has no choices");
                return Ok(Vec::new());
            }
        };

        parse_questions(strip_code_fence(&content)).map_err(ModelError::ContentNotJson)
    }
}

impl VisionModel for ModelClient {
    async fn extract_questions(&self, image_base64: &str) -> Vec<ExtractedQuestion> {
        match self.request_questions(image_base64).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Error calling vision model: {}", e);
                Vec::new()
            }
        }
    }
}

/// Build the request payload: the fixed prompt followed by the page image.
fn request_body<'a>(model: &'a str, image_base64: &str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: EXTRACTION_PROMPT,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: png_data_uri(image_base64),
                    },
                },
            ],
        }],
    }
}

/// Pull the first choice's text out of a chat-completions envelope.
///
/// `Ok(None)` when `choices` is absent, null or empty.
fn first_choice_content(body: &[u8]) -> Result<Option<String>, ModelError> {
    let envelope: ChatResponse =
        serde_json::from_slice(body).map_err(|e| ModelError::Envelope(e.to_string()))?;

    let Some(first) = envelope.choices.and_then(|c| c.into_iter().next()) else {
        return Ok(None);
    };

    first
        .message
        .and_then(|m| m.content)
        .map(Some)
        .ok_or(ModelError::MissingContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(request_body("vision-model", "QUJD")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "vision-model",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": EXTRACTION_PROMPT},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,QUJD"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn content_of_first_choice_is_used() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "[]"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        });
        let content = first_choice_content(body.to_string().as_bytes()).unwrap();
        assert_eq!(content.as_deref(), Some("[]"));
    }

    #[test]
    fn missing_null_or_empty_choices_mean_nothing_found() {
        for body in [json!({}), json!({"choices": null}), json!({"choices": []})] {
            let content = first_choice_content(body.to_string().as_bytes()).unwrap();
            assert!(content.is_none(), "body: {body}");
        }
    }

    #[test]
    fn choice_without_content_is_an_error() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        let err = first_choice_content(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ModelError::MissingContent));
    }

    #[test]
    fn non_json_envelope_is_an_error() {
        let err = first_choice_content(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ModelError::Envelope(_)));
    }

    #[test]
    fn client_copies_connection_settings() {
        let config = ExtractionConfig::builder()
            .api_key("k")
            .endpoint("http://127.0.0.1:9/v1/chat/completions")
            .model("m")
            .build()
            .unwrap();
        let client = ModelClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/chat/completions");
        assert_eq!(client.model, "m");
        assert_eq!(client.api_key, "k");
    }
}
