//! # docreader
//!
//! Convert uploaded Word, Excel, PowerPoint, PDF, HTML, CSV, JSON and XML
//! files to Markdown / plain text.
//!
//! The crate does not parse documents itself. Each upload is written to a
//! temp file that keeps its extension, handed to a [`ConversionEngine`]
//! (the `markitdown` program by default), and the extracted text is returned
//! with a preview, two downloads and a size comparison. The temp file is
//! removed whatever happens.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload(s)
//!  │
//!  ├─ 1. Materialize  write bytes to a temp file with the original suffix
//!  ├─ 2. Convert      engine.convert(path) on the blocking pool
//!  ├─ 3. Measure      converted size, reduction percentage
//!  ├─ 4. Render       preview + {name}_converted.md / .txt downloads
//!  └─ 5. Clean up     temp file deleted on every path
//! ```
//!
//! Files in a batch are processed one at a time in submission order. A
//! failure in one file is recorded in its [`FileReport`] and the batch moves
//! on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docreader::{process_batch, ConversionEngine, MarkItDownEngine, ReaderConfig, UploadedFile};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReaderConfig::default();
//!     let engine: Arc<dyn ConversionEngine> = Arc::new(MarkItDownEngine::from_config(&config));
//!     let upload = UploadedFile::new("report.docx", std::fs::read("report.docx")?);
//!
//!     let report = process_batch(vec![upload], &engine, &config).await;
//!     for file in &report.files {
//!         match file.converted() {
//!             Some(c) => println!("{}", c.result.text_content),
//!             None => eprintln!("{}: {:?}", file.name, file.error()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Browser UI + JSON API (axum, askama, base64) |
//! | `cli`    | on      | Enables the `docreader` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Library-only use:
//! ```toml
//! docreader = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use convert::{
    process_batch, process_batch_sync, process_file, read_upload, save_downloads, DownloadWriter,
};
pub use engine::{ConversionEngine, EngineOutput, MarkItDownEngine};
pub use error::{DocReaderError, EngineError, FileError, FRIENDLY_ERROR};
pub use output::{
    BatchReport, BatchStats, ConversionResult, ConvertedFile, Download, FileOutcome, FileReport,
    SizeComparison, UploadedFile,
};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
