//! PDF rasterisation: render one page at a time to `DynamicImage` via pdfium.
//!
//! The extraction loop only sees the [`PageSource`] trait. The pdfium-backed
//! [`PdfiumPageSource`] is the production implementation; tests substitute
//! an in-memory source so they run without a pdfium shared library.
//!
//! ## Why a render worker?
//!
//! pdfium documents hold raw C pointers and cannot cross threads, and
//! rendering is CPU-bound. [`PdfiumPageSource::open`] therefore starts one
//! `spawn_blocking` task that binds pdfium, opens the document once, and
//! renders pages on request. The handle only holds a channel, so every
//! future in the extraction pipeline stays `Send`.

use crate::error::Pdf2QuizError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Scale applied to the page's native size on both axes (72 DPI → 144 DPI).
pub const RENDER_SCALE: f32 = 2.0;

/// An ordered, immutable sequence of rasterisable pages.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterise the page at `index` (0-based) at [`RENDER_SCALE`].
    fn render_page(
        &self,
        index: usize,
    ) -> impl Future<Output = Result<DynamicImage, Pdf2QuizError>> + Send;
}

/// Bind to a pdfium shared library.
///
/// Lookup order: `PDFIUM_LIB_PATH`, then a library in the working
/// directory, then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2QuizError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2QuizError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

type RenderReply = oneshot::Sender<Result<DynamicImage, Pdf2QuizError>>;

/// A PDF opened through pdfium on a dedicated blocking worker.
///
/// The worker exits when the handle is dropped.
#[derive(Debug)]
pub struct PdfiumPageSource {
    requests: mpsc::UnboundedSender<(usize, RenderReply)>,
    page_count: usize,
}

impl PdfiumPageSource {
    /// Open `pdf_path`, mapping pdfium load errors to password / corruption errors.
    pub async fn open(pdf_path: &Path, password: Option<&str>) -> Result<Self, Pdf2QuizError> {
        let path = pdf_path.to_path_buf();
        let password = password.map(str::to_owned);
        let (ready_tx, ready_rx) = oneshot::channel();
        let (requests, request_rx) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || serve_pages(path, password, ready_tx, request_rx));

        let page_count = ready_rx.await.map_err(|_| {
            Pdf2QuizError::Internal("Render worker exited before opening the PDF".into())
        })??;

        Ok(Self {
            requests,
            page_count,
        })
    }
}

impl PageSource for PdfiumPageSource {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, index: usize) -> Result<DynamicImage, Pdf2QuizError> {
        let worker_gone = || Pdf2QuizError::RasterisationFailed {
            page: index + 1,
            detail: "render worker stopped".into(),
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send((index, reply_tx))
            .map_err(|_| worker_gone())?;
        reply_rx.await.map_err(|_| worker_gone())?
    }
}

// ── Blocking worker ──────────────────────────────────────────────────────

/// Body of the render worker: open once, then answer requests until the
/// handle is dropped.
fn serve_pages(
    path: PathBuf,
    password: Option<String>,
    ready: oneshot::Sender<Result<usize, Pdf2QuizError>>,
    mut requests: mpsc::UnboundedReceiver<(usize, RenderReply)>,
) {
    let pdfium = match bind_pdfium() {
        Ok(pdfium) => pdfium,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let document = match open_document(&pdfium, &path, password.as_deref()) {
        Ok(document) => document,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let page_count = document.pages().len() as usize;
    info!("PDF loaded: {} pages ({})", page_count, path.display());
    if ready.send(Ok(page_count)).is_err() {
        return;
    }

    let render_config = PdfRenderConfig::new().scale_page_by_factor(RENDER_SCALE);
    while let Some((index, reply)) = requests.blocking_recv() {
        let _ = reply.send(render_one(&document, &render_config, index));
    }
    debug!("Render worker for {} finished", path.display());
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2QuizError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2QuizError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2QuizError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2QuizError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn render_one(
    document: &PdfDocument<'_>,
    render_config: &PdfRenderConfig,
    index: usize,
) -> Result<DynamicImage, Pdf2QuizError> {
    let failed = |detail: String| Pdf2QuizError::RasterisationFailed {
        page: index + 1,
        detail,
    };

    let page_index = u16::try_from(index).map_err(|e| failed(e.to_string()))?;
    let page = document
        .pages()
        .get(page_index)
        .map_err(|e| failed(format!("{:?}", e)))?;

    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| failed(format!("{:?}", e)))?;

    // Flatten to RGB: pdfium renders onto an opaque white background,
    // the alpha channel only inflates the PNG.
    let image = DynamicImage::ImageRgb8(bitmap.as_image().to_rgb8());
    debug!(
        "Rendered page {} → {}x{} px",
        index + 1,
        image.width(),
        image.height()
    );

    Ok(image)
}
