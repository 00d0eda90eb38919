//! Configuration types for document conversion.
//!
//! All pipeline behaviour is controlled through [`ReaderConfig`], built via
//! its [`ReaderConfigBuilder`]. The same struct backs the CLI and the web UI.

use crate::error::DocReaderError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Extensions offered by the upload control.
pub const DEFAULT_ACCEPTED_EXTENSIONS: &[&str] =
    &["docx", "xlsx", "pptx", "pdf", "html", "csv", "json", "xml"];

/// Default per-file upload limit (200 MB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 200 * 1024 * 1024;

/// Default whole-request body limit (512 MB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 512 * 1024 * 1024;

/// Configuration for a conversion run.
///
/// Built via [`ReaderConfig::builder()`] or using [`ReaderConfig::default()`].
///
/// # Example
/// ```rust
/// use docreader::ReaderConfig;
///
/// let config = ReaderConfig::builder()
///     .engine_program("/usr/local/bin/markitdown")
///     .max_file_bytes(10 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.engine_program, "/usr/local/bin/markitdown");
/// ```
#[derive(Clone)]
pub struct ReaderConfig {
    /// Program invoked by [`crate::engine::MarkItDownEngine`]. Default: `markitdown`.
    pub engine_program: String,

    /// Extra arguments placed before the file path on the engine command line.
    pub engine_args: Vec<String>,

    /// Directory for temporary artifacts. `None` uses the OS temp directory.
    pub temp_dir: Option<PathBuf>,

    /// Extensions (without dot, lowercase) offered by the upload control.
    ///
    /// Only the presentation layer enforces this list; the pipeline converts
    /// whatever it is given.
    pub accepted_extensions: Vec<String>,

    /// Per-file upload limit in bytes. Larger files are reported as
    /// [`crate::error::FileError::UploadRejected`]. Default: 200 MB.
    pub max_file_bytes: u64,

    /// Request body limit for the web UI in bytes. Default: 512 MB.
    pub max_request_bytes: usize,

    /// Height of the preview area in the web UI. Default: 250.
    pub preview_height_px: u32,

    /// Include the size-comparison summary in results. Default: true.
    pub show_size_comparison: bool,

    /// Receives per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            engine_program: "markitdown".to_string(),
            engine_args: Vec::new(),
            temp_dir: None,
            accepted_extensions: DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            preview_height_px: 250,
            show_size_comparison: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("engine_program", &self.engine_program)
            .field("engine_args", &self.engine_args)
            .field("temp_dir", &self.temp_dir)
            .field("accepted_extensions", &self.accepted_extensions)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("max_request_bytes", &self.max_request_bytes)
            .field("preview_height_px", &self.preview_height_px)
            .field("show_size_comparison", &self.show_size_comparison)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ReaderConfig {
    /// Create a new builder for `ReaderConfig`.
    pub fn builder() -> ReaderConfigBuilder {
        ReaderConfigBuilder {
            config: Self::default(),
        }
    }

    /// The `accept` attribute value for an HTML file input, e.g. `.docx,.pdf`.
    pub fn accept_attribute(&self) -> String {
        self.accepted_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Builder for [`ReaderConfig`].
#[derive(Debug)]
pub struct ReaderConfigBuilder {
    config: ReaderConfig,
}

impl ReaderConfigBuilder {
    pub fn engine_program(mut self, program: impl Into<String>) -> Self {
        self.config.engine_program = program.into();
        self
    }

    pub fn engine_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.engine_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn accepted_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.accepted_extensions = exts
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn max_request_bytes(mut self, n: usize) -> Self {
        self.config.max_request_bytes = n;
        self
    }

    pub fn preview_height_px(mut self, px: u32) -> Self {
        self.config.preview_height_px = px.clamp(80, 2000);
        self
    }

    pub fn show_size_comparison(mut self, v: bool) -> Self {
        self.config.show_size_comparison = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReaderConfig, DocReaderError> {
        let c = &self.config;
        if c.engine_program.trim().is_empty() {
            return Err(DocReaderError::InvalidConfig(
                "Engine program must not be empty".into(),
            ));
        }
        if c.max_file_bytes == 0 {
            return Err(DocReaderError::InvalidConfig(
                "Per-file upload limit must be ≥ 1 byte".into(),
            ));
        }
        if (c.max_request_bytes as u64) < c.max_file_bytes {
            return Err(DocReaderError::InvalidConfig(format!(
                "Request limit ({} bytes) is smaller than the per-file limit ({} bytes)",
                c.max_request_bytes, c.max_file_bytes
            )));
        }
        if c.accepted_extensions.is_empty() {
            return Err(DocReaderError::InvalidConfig(
                "At least one accepted extension is required".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_control() {
        let c = ReaderConfig::default();
        assert_eq!(c.engine_program, "markitdown");
        assert_eq!(c.accepted_extensions.len(), 8);
        assert_eq!(c.preview_height_px, 250);
        assert!(c.show_size_comparison);
        assert_eq!(
            c.accept_attribute(),
            ".docx,.xlsx,.pptx,.pdf,.html,.csv,.json,.xml"
        );
    }

    #[test]
    fn builder_normalises_extensions() {
        let c = ReaderConfig::builder()
            .accepted_extensions([".PDF", "csv", ""])
            .build()
            .unwrap();
        assert_eq!(c.accepted_extensions, vec!["pdf", "csv"]);
    }

    #[test]
    fn builder_rejects_empty_program() {
        let err = ReaderConfig::builder().engine_program("  ").build();
        assert!(matches!(err, Err(DocReaderError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_request_limit_below_file_limit() {
        let err = ReaderConfig::builder()
            .max_file_bytes(1024)
            .max_request_bytes(512)
            .build();
        assert!(matches!(err, Err(DocReaderError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_no_extensions() {
        let err = ReaderConfig::builder()
            .accepted_extensions(Vec::<String>::new())
            .build();
        assert!(matches!(err, Err(DocReaderError::InvalidConfig(_))));
    }

    #[test]
    fn debug_hides_callback() {
        let c = ReaderConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        assert!(format!("{c:?}").contains("<dyn BatchProgressCallback>"));
    }
}
