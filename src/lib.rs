//! # edgequake-pdf2quiz
//!
//! Extract multiple-choice exam questions from PDF study guides using a
//! Vision Language Model (VLM).
//!
//! ## Why this crate?
//!
//! Exam guides mix question text, lettered options, answer keys and
//! explanations across columns and page breaks. Text extraction loses that
//! structure. Instead this crate rasterises each page into a PNG and asks a
//! VLM to read the questions off it as structured JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       check the local file is a readable PDF
//!  ├─ 2. Render      rasterise one page at 2× via pdfium
//!  ├─ 3. Encode      PNG → base64
//!  ├─ 4. VLM         one chat-completions call per page (OpenRouter by default)
//!  ├─ 5. Parse       strip code fences, parse the JSON question array
//!  ├─ 6. Checkpoint  `<output>.checkpoint` rewritten after every page
//!  └─ 7. Output      the accumulated question array
//! ```
//!
//! Pages are processed strictly in order with a fixed pause between calls.
//! An interrupted run resumes from its checkpoint. A failed model call costs
//! one page, never the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2quiz::{extract_pdf, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from OPENROUTER_API_KEY
//!     let config = ExtractionConfig::builder()
//!         .api_key_from_env()
//!         .start_page(1)
//!         .build()?;
//!     let summary = extract_pdf("guide.pdf", "public/questions.json", &config).await?;
//!     eprintln!("{} questions from {} pages",
//!         summary.total_questions,
//!         summary.pages_processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2quiz` binary (clap + anyhow + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-pdf2quiz = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use checkpoint::{checkpoint_path, CheckpointState};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{CheckpointError, ModelError, Pdf2QuizError};
pub use extract::{extract_pdf, extract_pdf_sync, run_extraction};
pub use output::{CheckpointOrigin, ExtractedQuestion, ExtractionSummary};
pub use pipeline::llm::{ModelClient, VisionModel};
pub use pipeline::render::{PageSource, PdfiumPageSource};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
