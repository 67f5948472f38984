//! Status-observer trait for human-readable progress lines.
//!
//! Pass any [`StatusObserver`] to [`crate::split::process_document`] or
//! [`crate::split::process_path`] to receive a line of text after each major
//! step: scan start, mode decision, per-SKU file creation, verification and
//! the final summary.
//!
//! Calls are issued synchronously on the processing thread, so a slow
//! observer slows processing. The pipeline never inspects what the observer
//! does with a message.
//!
//! # Example
//!
//! ```rust
//! use sku_split::{RecordingObserver, StatusObserver};
//!
//! let observer = RecordingObserver::default();
//! observer.report("Scanning 3 pages...");
//! assert_eq!(observer.messages(), vec!["Scanning 3 pages...".to_string()]);
//! ```

use std::sync::Mutex;

/// Receives progress text from the pipeline.
///
/// Implementations must be `Send + Sync` so one observer can be shared by
/// documents processed on separate worker threads.
pub trait StatusObserver: Send + Sync {
    /// Called with one line of progress text (no trailing newline).
    fn report(&self, message: &str);
}

/// A no-op observer for callers that don't need progress text.
pub struct NoopObserver;

impl StatusObserver for NoopObserver {
    fn report(&self, _message: &str) {}
}

/// Collects every message in order; useful in tests and for post-run logs.
#[derive(Default)]
pub struct RecordingObserver {
    messages: Mutex<Vec<String>>,
}

impl RecordingObserver {
    /// Snapshot of the messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// True if any received message contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl StatusObserver for RecordingObserver {
    fn report(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}

impl<F> StatusObserver for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}
