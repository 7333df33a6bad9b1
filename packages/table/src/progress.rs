//! Progress reporting for table loading and dashboard runs.
//!
//! [`ProgressCallback`] keeps the loaders and the analysis pipeline free of
//! any rendering backend. Binaries plug in `indicatif` bars; library callers
//! and tests use [`NullProgress`].

/// Receives progress updates from a long-running step.
pub trait ProgressCallback {
    /// Sets the total expected units of work.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks progress as complete with a final message.
    fn finish(&self, msg: String);

    /// Marks progress as complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}
