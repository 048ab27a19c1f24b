//! Progress-callback trait for per-page export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events as the exporter walks the notebooks.
//!
//! # Example
//!
//! ```rust
//! use onenote2md::{ExportConfig, ExportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page: &str, images: usize) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{page}: {images} images");
//!     }
//! }
//!
//! let cb = Arc::new(CountingCallback { done: AtomicUsize::new(0) });
//! let config = ExportConfig::builder()
//!     .progress_callback(cb as Arc<dyn ExportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the exporter as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `page` is the Markdown path relative to the export
/// root.
pub trait ExportProgressCallback: Send + Sync {
    /// Called once after the hierarchy has been collected.
    ///
    /// # Arguments
    /// * `pages` — number of pages that will be exported
    fn on_export_start(&self, pages: usize) {
        let _ = pages;
    }

    /// Called when the traversal enters a notebook.
    fn on_notebook_start(&self, name: &str) {
        let _ = name;
    }

    /// Called before a page is published.
    fn on_page_start(&self, page: &str) {
        let _ = page;
    }

    /// Called when a page's Markdown file has been written.
    fn on_page_complete(&self, page: &str, images: usize) {
        let _ = (page, images);
    }

    /// Called when a page is skipped after an automation failure.
    fn on_page_error(&self, page: &str, error: &str) {
        let _ = (page, error);
    }

    /// Called once at the end of a successful run.
    fn on_export_complete(&self, exported: usize, failed: usize) {
        let _ = (exported, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
    }

    impl ExportProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page: &str, _images: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_export_start(2);
        cb.on_notebook_start("Work");
        cb.on_page_start("Work/Inbox/000 Todo.md");
        cb.on_page_complete("Work/Inbox/000 Todo.md", 3);
        cb.on_page_error("Work/Inbox/001 x.md", "boom");
        cb.on_export_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_start("a");
        tracker.on_page_complete("a", 0);
        tracker.on_page_start("b");
        tracker.on_page_error("b", "automation failed");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_export_start(1);
        cb.on_page_complete("x", 1);
    }
}
