//! Input and result types passed through the conversion pipeline.
//!
//! Nothing here is persisted: an [`UploadedFile`] lives for one request, and
//! a [`BatchReport`] is handed to the presentation layer and dropped.

use crate::error::FileError;
use serde::Serialize;

/// One file received from the upload control or read from disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as supplied by the client, including the extension.
    pub name: String,
    /// Raw bytes.
    pub content: Vec<u8>,
    /// Size the client declared, if any. Informational only.
    pub declared_size: Option<u64>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            declared_size: None,
        }
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Byte length of the content actually received.
    pub fn original_size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Text extracted from one file plus its size metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub text_content: String,
    pub original_size: u64,
    /// UTF-8 byte length of `text_content`.
    pub converted_size: u64,
    /// `(original - converted) / original * 100`, or 0 for an empty original.
    pub reduction_pct: f64,
}

/// A downloadable representation of the converted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Size summary shown beside the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeComparison {
    pub original_size: u64,
    pub converted_size: u64,
    pub reduction_pct: f64,
    pub original_display: String,
    pub converted_display: String,
    pub summary: String,
}

/// Everything the presentation layer needs for a converted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedFile {
    pub result: ConversionResult,
    pub markdown: Download,
    pub plain_text: Download,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_comparison: Option<SizeComparison>,
}

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted(Box<ConvertedFile>),
    Failed(FileError),
}

/// Per-file entry of a [`BatchReport`], in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Converted(_))
    }

    pub fn converted(&self) -> Option<&ConvertedFile> {
        match &self.outcome {
            FileOutcome::Converted(c) => Some(c),
            FileOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FileError> {
        match &self.outcome {
            FileOutcome::Converted(_) => None,
            FileOutcome::Failed(e) => Some(e),
        }
    }
}

/// Aggregate numbers for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub converted_files: usize,
    pub failed_files: usize,
    pub total_original_bytes: u64,
    pub total_converted_bytes: u64,
    pub duration_ms: u64,
}

/// Result of processing a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub stats: BatchStats,
}

impl BatchReport {
    pub fn all_converted(&self) -> bool {
        self.stats.failed_files == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_size_is_received_length() {
        let f = UploadedFile::new("a.csv", b"1,2,3".to_vec()).with_declared_size(99);
        assert_eq!(f.original_size(), 5);
        assert_eq!(f.declared_size, Some(99));
    }

    #[test]
    fn failed_report_serialises_status() {
        let report = FileReport {
            name: "bad.pdf".into(),
            outcome: FileOutcome::Failed(FileError::ConversionEngine {
                file: "bad.pdf".into(),
                detail: "corrupt".into(),
            }),
        };
        assert!(!report.is_converted());
        assert!(report.error().is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "failed");
        assert_eq!(json["outcome"]["detail"]["kind"], "conversion_engine");
    }

    #[test]
    fn download_bytes_are_not_serialised() {
        let d = Download {
            file_name: "a_converted.md".into(),
            mime_type: "text/markdown",
            data: b"# hi".to_vec(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["mime_type"], "text/markdown");
    }
}
