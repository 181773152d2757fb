//! The checkpointed extraction loop and its entry points.
//!
//! For every page from the checkpoint's `last_page` to the end of the
//! document:
//!
//! ```text
//! render ─▶ encode ─▶ model ─▶ append ─▶ last_page += 1 ─▶ save checkpoint ─▶ sleep
//! ```
//!
//! then the accumulated questions are written, unwrapped, to the output file.
//!
//! A page whose model call fails contributes nothing, but the loop still
//! moves past it. Rasterisation, encoding, checkpoint and output failures
//! abort the run; the checkpoint on disk then reflects the last completed
//! page.

use crate::checkpoint::{checkpoint_path, CheckpointState};
use crate::config::ExtractionConfig;
use crate::error::Pdf2QuizError;
use crate::output::{to_pretty_json, write_atomic, ExtractedQuestion, ExtractionSummary};
use crate::pipeline::llm::{ModelClient, VisionModel};
use crate::pipeline::render::{PageSource, PdfiumPageSource};
use crate::pipeline::{encode, input};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Extract questions from a PDF file and write them to `output_path`.
///
/// This is the primary entry point for the library. It validates the input,
/// builds a [`ModelClient`] from `config`, opens the PDF on a pdfium render
/// worker and runs [`run_extraction`]. The returned future is `Send`, so it
/// can be handed to `tokio::spawn`.
///
/// # Errors
/// Only fatal errors are returned: bad input file, pdfium unavailable,
/// rasterisation failure, or a checkpoint/output file that cannot be
/// written. Model failures never surface here.
pub async fn extract_pdf(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionSummary, Pdf2QuizError> {
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;
    let client = ModelClient::new(config)?;

    let source = PdfiumPageSource::open(&pdf_path, config.password.as_deref()).await?;

    run_extraction(&source, &client, output_path.as_ref(), config).await
}

/// Synchronous wrapper around [`extract_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_pdf_sync(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionSummary, Pdf2QuizError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2QuizError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_pdf(pdf_path, output_path, config))
}

/// Run the checkpointed loop over any page source and vision model.
///
/// Loads `<output_path>.checkpoint` if present, processes every remaining
/// page, and writes the final question array to `output_path`.
pub async fn run_extraction<S, M>(
    source: &S,
    model: &M,
    output_path: &Path,
    config: &ExtractionConfig,
) -> Result<ExtractionSummary, Pdf2QuizError>
where
    S: PageSource,
    M: VisionModel,
{
    let run_start = Instant::now();
    let total_pages = source.page_count();
    let checkpoint_file = checkpoint_path(output_path);

    ensure_parent_dir(output_path).await?;

    let (mut state, origin) = CheckpointState::load(&checkpoint_file, config.start_page).await;
    let first_index = state.last_page;

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(first_index + 1, total_pages);
    }

    let delay = Duration::from_millis(config.page_delay_ms);
    let mut pages_processed = 0;
    let mut empty_pages = 0;
    let mut questions_added = 0;

    for i in first_index..total_pages {
        let page_num = i + 1;
        info!("Processing page {}/{}...", page_num, total_pages);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let image = source.render_page(i).await?;
        let image_base64 =
            encode::encode_page(&image).map_err(|e| Pdf2QuizError::RasterisationFailed {
                page: page_num,
                detail: format!("Image encoding failed: {}", e),
            })?;

        let questions = model.extract_questions(&image_base64).await;
        let found = questions.len();
        if found > 0 {
            info!("  Found {} questions.", found);
            state.questions.extend(questions);
        } else {
            info!("  No questions found on page {}.", page_num);
            empty_pages += 1;
        }

        state.last_page = page_num;
        state.save(&checkpoint_file).await?;

        pages_processed += 1;
        questions_added += found;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total_pages, found);
        }

        tokio::time::sleep(delay).await;
    }

    write_questions(output_path, &state.questions).await?;
    info!(
        "Finished. Total questions extracted: {}",
        state.questions.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(pages_processed, state.questions.len());
    }

    Ok(ExtractionSummary {
        first_page: first_index + 1,
        total_pages,
        pages_processed,
        empty_pages,
        questions_added,
        total_questions: state.questions.len(),
        checkpoint: origin,
        duration_ms: run_start.elapsed().as_millis() as u64,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Write the final, unwrapped question array.
async fn write_questions(
    output_path: &Path,
    questions: &[ExtractedQuestion],
) -> Result<(), Pdf2QuizError> {
    let write_failed = |source| Pdf2QuizError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source,
    };

    let bytes = to_pretty_json(questions).map_err(|e| write_failed(e.into()))?;
    write_atomic(output_path, &bytes).await.map_err(write_failed)
}

async fn ensure_parent_dir(output_path: &Path) -> Result<(), Pdf2QuizError> {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Pdf2QuizError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                source,
            }),
        _ => Ok(()),
    }
}
