//! Input validation: make sure the path is a readable PDF before pdfium opens it.
//!
//! pdfium reports a missing or non-PDF file as a generic load failure. Checking
//! existence, permissions and the `%PDF` magic bytes here gives the user an
//! error that says what is actually wrong.

use crate::error::Pdf2QuizError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path, returning it unchanged on success.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2QuizError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Pdf2QuizError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2QuizError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2QuizError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2QuizError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
