//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the loop works through the document. The CLI uses this to drive
//! its progress bar; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2quiz::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct QuestionCounter {
//!     seen: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for QuestionCounter {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, question_count: usize) {
//!         self.seen.fetch_add(question_count, Ordering::SeqCst);
//!         eprintln!("page {page_num}/{total_pages}: {question_count} questions");
//!     }
//! }
//!
//! let counter = Arc::new(QuestionCounter { seen: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .api_key("sk-or-test")
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the extraction loop as it processes each page.
///
/// Pages are processed strictly one after another, so events arrive in page
/// order. All methods have no-op defaults.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once, after the checkpoint is loaded and before the first page.
    ///
    /// # Arguments
    /// * `first_page`  — 1-indexed page the run resumes at
    /// * `total_pages` — pages in the document
    fn on_run_start(&self, first_page: usize, total_pages: usize) {
        let _ = (first_page, total_pages);
    }

    /// Called just before a page is rasterised.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page's questions are appended and the checkpoint saved.
    ///
    /// `question_count` is zero both for pages without questions and for
    /// pages whose model call failed.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, question_count: usize) {
        let _ = (page_num, total_pages, question_count);
    }

    /// Called once after the final output file is written.
    ///
    /// # Arguments
    /// * `pages_processed` — pages handled by this run
    /// * `total_questions` — questions in the output file
    fn on_run_complete(&self, pages_processed: usize, total_questions: usize) {
        let _ = (pages_processed, total_questions);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        pages: AtomicUsize,
        questions: AtomicUsize,
        finished_with: AtomicUsize,
    }

    impl ExtractionProgressCallback for TrackingCallback {
        fn on_page_complete(&self, _page_num: usize, _total: usize, question_count: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
            self.questions.fetch_add(question_count, Ordering::SeqCst);
        }

        fn on_run_complete(&self, _pages_processed: usize, total_questions: usize) {
            self.finished_with.store(total_questions, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(19, 40);
        cb.on_page_start(19, 40);
        cb.on_page_complete(19, 40, 3);
        cb.on_run_complete(22, 61);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_complete(1, 3, 4);
        tracker.on_page_complete(2, 3, 0);
        tracker.on_page_complete(3, 3, 2);
        tracker.on_run_complete(3, 6);

        assert_eq!(tracker.pages.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.questions.load(Ordering::SeqCst), 6);
        assert_eq!(tracker.finished_with.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_run_start(1, 10);
        cb.on_page_complete(1, 10, 5);
    }
}
