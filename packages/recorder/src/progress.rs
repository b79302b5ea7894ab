//! Progress reporting for recording sessions.
//!
//! The recorder reports the number of captured points through
//! [`ProgressCallback`] so a front end can show a live counter without
//! the recorder knowing how it is drawn.

use std::sync::Arc;

/// Receives progress updates from a recording session.
///
/// Implementations must be `Send + Sync` so they can be shared via `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Set the current position (absolute, not delta).
    fn set_position(&self, pos: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
