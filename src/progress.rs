//! Progress-callback trait for per-step conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConvertConfigBuilder::progress_callback`] to hear about
//! each handler the router runs. A direct conversion is one step; a chain is
//! two.
//!
//! # Example
//!
//! ```rust
//! use convctl::{ConversionProgressCallback, ConvertConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     steps: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_step_complete(&self, step: usize, total_steps: usize) {
//!         self.steps.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("step {step}/{total_steps} done");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { steps: AtomicUsize::new(0) });
//!
//! let config = ConvertConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::format::ConversionKey;
use std::sync::Arc;

/// Called by the router as it executes a route.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The router is single-threaded, but the trait is
/// `Send + Sync` so one callback can be shared with a UI thread.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after routing and before the first handler runs.
    ///
    /// # Arguments
    /// * `total_steps`: 1 for a direct conversion, 2 for a chain
    fn on_conversion_start(&self, total_steps: usize) {
        let _ = total_steps;
    }

    /// Called just before a handler runs.
    ///
    /// # Arguments
    /// * `step`       : 1-indexed step number
    /// * `total_steps`: number of steps in the route
    /// * `key`        : the conversion this step performs
    fn on_step_start(&self, step: usize, total_steps: usize, key: &ConversionKey) {
        let _ = (step, total_steps, key);
    }

    /// Called when a handler returns successfully.
    fn on_step_complete(&self, step: usize, total_steps: usize) {
        let _ = (step, total_steps);
    }

    /// Called when a handler fails. No further steps run after this.
    ///
    /// # Arguments
    /// * `error`: human-readable error description
    fn on_step_error(&self, step: usize, total_steps: usize, error: &str) {
        let _ = (step, total_steps, error);
    }

    /// Called once after every step succeeded.
    fn on_conversion_complete(&self, total_steps: usize) {
        let _ = total_steps;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConvertConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_steps: usize) {
            self.total.store(total_steps, Ordering::SeqCst);
        }

        fn on_step_start(&self, _step: usize, _total: usize, _key: &ConversionKey) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step_complete(&self, _step: usize, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_step_error(&self, _step: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        let key = ConversionKey::new("docx", "pdf");
        cb.on_conversion_start(2);
        cb.on_step_start(1, 2, &key);
        cb.on_step_complete(1, 2);
        cb.on_step_error(2, 2, "boom");
        cb.on_conversion_complete(2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        let key = ConversionKey::new("docx", "pdf");

        tracker.on_conversion_start(2);
        tracker.on_step_start(1, 2, &key);
        tracker.on_step_complete(1, 2);
        tracker.on_step_start(2, 2, &ConversionKey::new("pdf", "png"));
        tracker.on_step_error(2, 2, "rasteriser missing");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(1);
        cb.on_step_complete(1, 1);
    }
}
