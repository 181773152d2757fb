//! Configuration types for question extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The API credential is read once, at
//! construction time, and handed to the model client from here; nothing in
//! the pipeline reads the process environment on its own.

use crate::error::Pdf2QuizError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Chat-completions endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Vision model used when none is configured.
pub const DEFAULT_MODEL: &str = "qwen/qwen3-vl-30b-a3b-instruct";

/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Configuration for an extraction run.
///
/// Built via [`ExtractionConfig::builder()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2quiz::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .api_key("sk-or-test")
///     .start_page(3)
///     .page_delay_ms(250)
///     .build()
///     .unwrap();
/// assert_eq!(config.start_page, 3);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Bearer token for the chat-completions endpoint.
    pub api_key: String,

    /// Chat-completions URL. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Model identifier sent in every request. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// 1-indexed page where a fresh run begins. Default: 19.
    ///
    /// Also the restart point when only a legacy (bare array) checkpoint
    /// exists.
    pub start_page: usize,

    /// Pause after every page, in milliseconds. Default: 1000.
    ///
    /// Keeps the request rate under the provider's limit. Applied after
    /// every page, including pages whose model call failed.
    pub page_delay_ms: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            start_page: 19,
            page_delay_ms: 1000,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("start_page", &self.start_page)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Page index (0-based) a fresh run starts from: `start_page - 1`.
    pub fn first_page_index(&self) -> usize {
        self.start_page.saturating_sub(1)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Read the API key from `OPENROUTER_API_KEY`. Leaves the key unset
    /// (and `build()` failing) when the variable is absent.
    pub fn api_key_from_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.config.api_key = key;
        }
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn start_page(mut self, page: usize) -> Self {
        self.config.start_page = page;
        self
    }

    pub fn page_delay_ms(mut self, ms: u64) -> Self {
        self.config.page_delay_ms = ms;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2QuizError> {
        let c = &self.config;
        if c.start_page < 1 {
            return Err(Pdf2QuizError::InvalidConfig(
                "start page is 1-indexed, minimum is 1".into(),
            ));
        }
        if c.api_key.trim().is_empty() {
            return Err(Pdf2QuizError::InvalidConfig(format!(
                "API key is empty; set {API_KEY_ENV} or pass --api-key"
            )));
        }
        if c.model.trim().is_empty() {
            return Err(Pdf2QuizError::InvalidConfig("model must not be empty".into()));
        }
        if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
            return Err(Pdf2QuizError::InvalidConfig(format!(
                "endpoint must be an HTTP(S) URL, got '{}'",
                c.endpoint
            )));
        }
        Ok(self.config)
    }
}
