//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ReaderConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through a batch. The CLI drives its progress
//! bar from these; the web UI leaves the callback unset.
//!
//! # Example
//!
//! ```rust
//! use docreader::{BatchProgressCallback, ReaderConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_complete(&self, index: usize, total: usize, name: &str, converted_size: u64) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{}/{}] {} → {} bytes", index + 1, total, name, converted_size);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ReaderConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch loop as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed sequentially, so events for one
/// batch never interleave; `Send + Sync` is still required because the
/// callback lives inside a shared [`crate::config::ReaderConfig`].
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first file.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is materialized.
    ///
    /// # Arguments
    /// * `index`: 0-based position in the batch
    /// * `total`: number of files in the batch
    /// * `name` : uploaded file name
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file converted successfully.
    ///
    /// `converted_size` is the UTF-8 byte length of the extracted text.
    fn on_file_complete(&self, index: usize, total: usize, name: &str, converted_size: u64) {
        let _ = (index, total, name, converted_size);
    }

    /// Called when a file failed at any stage.
    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let _ = (total_files, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ReaderConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
