//! Error types for the edgequake-pdf2quiz library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`Pdf2QuizError`] — **Fatal**: the extraction cannot proceed (bad input
//!   file, pdfium unavailable, a page that will not rasterise, a checkpoint or
//!   output file that cannot be written). Returned as `Err(Pdf2QuizError)`
//!   from the top-level `extract*` functions.
//!
//! * [`ModelError`] — **Non-fatal**: one model call failed (network error,
//!   bad status, unparsable answer). The page contributes zero questions and
//!   the run moves on to the next page.
//!
//! * [`CheckpointError`] — **Non-fatal**: an existing checkpoint could not be
//!   read. The run logs it and starts from a fresh state.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2quiz library.
#[derive(Debug, Error)]
pub enum Pdf2QuizError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page (1-indexed).
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the per-page checkpoint file.
    #[error("Failed to write checkpoint '{path}': {source}")]
    CheckpointWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the final questions file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or\n\
set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure of a single model call.
///
/// Never escapes [`crate::pipeline::llm::VisionModel::extract_questions`];
/// it exists so the failure reason can be logged and unit-tested.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Connection refused, reset, DNS failure, TLS failure, …
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a chat-completions envelope.
    #[error("malformed response envelope: {0}")]
    Envelope(String),

    /// The first choice carried no text content.
    #[error("first choice has no message content")]
    MissingContent,

    /// The (fence-stripped) content did not parse as a question array.
    #[error("model output is not a JSON question array: {0}")]
    ContentNotJson(#[source] serde_json::Error),
}

/// A non-fatal failure to read an existing checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a recognised checkpoint: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
