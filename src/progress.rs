//! Progress-callback trait for analysis phase events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from extraction through the model fallback
//! chain to completion.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, or a terminal spinner without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` so it can cross task boundaries freely.

use std::sync::Arc;

/// Called by the analysis pipeline as it moves through its phases.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The pipeline is strictly sequential, so events for
/// a single run never arrive concurrently.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before text extraction begins.
    fn on_extraction_start(&self) {}

    /// Called when extraction finishes.
    ///
    /// # Arguments
    /// * `pages` — number of pages in the document
    /// * `chars` — total characters extracted
    fn on_extraction_complete(&self, pages: usize, chars: usize) {
        let _ = (pages, chars);
    }

    /// Called just before a candidate model is tried.
    ///
    /// # Arguments
    /// * `model` — candidate model identifier
    /// * `index` — 0-based position in the fallback chain
    /// * `total` — length of the candidate list
    fn on_model_attempt(&self, model: &str, index: usize, total: usize) {
        let _ = (model, index, total);
    }

    /// Called when a candidate model fails and the chain moves on.
    fn on_model_failed(&self, model: &str, error: &str) {
        let _ = (model, error);
    }

    /// Called once when a candidate produced a well-formed answer.
    ///
    /// # Arguments
    /// * `model` — the winning model identifier
    /// * `chars` — length of the returned analysis text
    fn on_analysis_complete(&self, model: &str, chars: usize) {
        let _ = (model, chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        attempts: AtomicUsize,
        failures: AtomicUsize,
        completed: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_model_attempt(&self, _model: &str, _index: usize, _total: usize) {
            self.attempts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_model_failed(&self, _model: &str, _error: &str) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        fn on_analysis_complete(&self, _model: &str, chars: usize) {
            self.completed.store(chars, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start();
        cb.on_extraction_complete(3, 1200);
        cb.on_model_attempt("gemini-2.0-flash", 0, 1);
        cb.on_model_failed("gemini-2.0-flash", "HTTP 429");
        cb.on_analysis_complete("gemini-2.0-flash", 512);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            attempts: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        };

        tracker.on_model_attempt("a", 0, 2);
        tracker.on_model_failed("a", "transport error");
        tracker.on_model_attempt("b", 1, 2);
        tracker.on_analysis_complete("b", 900);

        assert_eq!(tracker.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completed.load(Ordering::SeqCst), 900);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn AnalysisProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_extraction_complete(1, 10);
    }
}
