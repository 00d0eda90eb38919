//! Error types for the docreader library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`DocReaderError`]: **Fatal**: the process or request cannot proceed at
//!   all (bad configuration, server cannot bind, malformed multipart body).
//!   Returned as `Err(DocReaderError)` from setup and I/O entry points.
//!
//! * [`FileError`]: **Non-fatal**: a single uploaded file failed (temp-file
//!   write, size limit, engine fault) but its siblings are unaffected. Stored
//!   inside [`crate::output::FileReport`] rather than propagated.
//!
//! * [`EngineError`]: what a [`crate::engine::ConversionEngine`] returns.
//!   The pipeline only stringifies it into [`FileError::ConversionEngine`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Fixed, non-technical message shown for any per-file failure.
pub const FRIENDLY_ERROR: &str = "⚠️ Please upload the file in a supported format!";

/// Suffix appended to [`FRIENDLY_ERROR`] when the upload itself failed.
pub const UPLOAD_FAILED_SUFFIX: &str = "(File upload failed)";

/// All fatal errors returned by the docreader library.
///
/// Per-file failures use [`FileError`] and are stored in
/// [`crate::output::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DocReaderError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A local input file was not found (CLI `convert`).
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Reading a local input file failed for another reason.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The multipart request body could not be parsed.
    #[error("Malformed upload request: {0}")]
    MalformedUpload(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a converted output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP listener could not be bound or the server stopped with an error.
    #[error("Server error on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single uploaded file.
///
/// The batch continues with the next file whatever the variant.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// The upload could not be written to a temporary file.
    #[error("could not persist upload '{file}': {detail}")]
    UploadPersistence { file: String, detail: String },

    /// The upload exceeds the configured per-file size limit.
    #[error("'{file}' is {size} bytes, above the {limit}-byte upload limit")]
    UploadRejected { file: String, size: u64, limit: u64 },

    /// The conversion engine could not handle the file.
    #[error("conversion of '{file}' failed: {detail}")]
    ConversionEngine { file: String, detail: String },
}

impl FileError {
    /// True when the file never reached the engine.
    pub fn is_upload_failure(&self) -> bool {
        matches!(
            self,
            FileError::UploadPersistence { .. } | FileError::UploadRejected { .. }
        )
    }

    /// The fixed user-facing message for this failure.
    pub fn friendly_message(&self) -> String {
        if self.is_upload_failure() {
            format!("{FRIENDLY_ERROR} {UPLOAD_FAILED_SUFFIX}")
        } else {
            FRIENDLY_ERROR.to_string()
        }
    }

    /// Raw technical detail, shown in the collapsed details area.
    pub fn technical_detail(&self) -> String {
        match self {
            FileError::UploadPersistence { detail, .. } => detail.clone(),
            FileError::ConversionEngine { detail, .. } => detail.clone(),
            FileError::UploadRejected { .. } => self.to_string(),
        }
    }
}

/// Error raised by a conversion engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but rejected the input.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The engine produced output that is not valid UTF-8.
    #[error("engine output is not valid UTF-8: {0}")]
    InvalidOutput(String),

    /// The engine crashed while converting.
    #[error("engine crashed: {0}")]
    Crashed(String),

    /// Any other engine-specific fault.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_message_has_suffix() {
        let e = FileError::UploadPersistence {
            file: "a.docx".into(),
            detail: "disk full".into(),
        };
        assert!(e.is_upload_failure());
        assert!(e.friendly_message().ends_with(UPLOAD_FAILED_SUFFIX));
        assert_eq!(e.technical_detail(), "disk full");
    }

    #[test]
    fn engine_failure_message_is_fixed() {
        let e = FileError::ConversionEngine {
            file: "bad.pdf".into(),
            detail: "not a PDF".into(),
        };
        assert!(!e.is_upload_failure());
        assert_eq!(e.friendly_message(), FRIENDLY_ERROR);
        assert!(e.to_string().contains("bad.pdf"));
    }

    #[test]
    fn rejected_display() {
        let e = FileError::UploadRejected {
            file: "huge.pdf".into(),
            size: 300,
            limit: 200,
        };
        let msg = e.to_string();
        assert!(msg.contains("300"), "got: {msg}");
        assert!(msg.contains("200-byte"), "got: {msg}");
    }

    #[test]
    fn file_error_serialises_with_kind_tag() {
        let e = FileError::ConversionEngine {
            file: "x.csv".into(),
            detail: "boom".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "conversion_engine");
        assert_eq!(json["detail"], "boom");
    }

    #[test]
    fn engine_failed_display() {
        let e = EngineError::Failed {
            program: "markitdown".into(),
            status: "exit status: 1".into(),
            stderr: "UnsupportedFormatException".into(),
        };
        assert!(e.to_string().contains("UnsupportedFormatException"));
    }
}
