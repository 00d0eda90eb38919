//! Askama view models for the upload and results pages.
//!
//! Templates live in `templates/` and are HTML-escaped by askama; the view
//! structs below hold only plain strings and flags.

use super::AppState;
use crate::error::FileError;
use crate::output::{BatchReport, ConvertedFile, Download, FileOutcome};
use askama::Template;
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const PAGE_TITLE: &str = "Universal Document Reader";

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    pub accept: String,
    pub formats: String,
    pub engine_name: String,
    pub engine_error: Option<String>,
}

impl IndexTemplate {
    pub fn new(state: &AppState) -> Self {
        Self {
            title: PAGE_TITLE,
            accept: state.config.accept_attribute(),
            formats: state
                .config
                .accepted_extensions
                .iter()
                .map(|e| e.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join(", "),
            engine_name: state.engine.name().to_string(),
            engine_error: state.engine_error.clone(),
        }
    }
}

/// A download link backed by a `data:` URI.
pub struct DownloadView {
    pub label: &'static str,
    pub file_name: String,
    pub href: String,
}

impl DownloadView {
    fn new(label: &'static str, download: &Download) -> Self {
        Self {
            label,
            file_name: download.file_name.clone(),
            href: data_uri(download.mime_type, &download.data),
        }
    }
}

pub struct ComparisonView {
    pub original: String,
    pub converted: String,
    pub reduction: String,
    pub summary: String,
    pub positive: bool,
}

/// One file section on the results page.
pub struct FileView {
    pub name: String,
    pub converted: bool,
    pub preview: String,
    pub downloads: Vec<DownloadView>,
    pub comparison: Option<ComparisonView>,
    pub friendly_error: String,
    pub technical_error: String,
}

impl FileView {
    fn converted(name: &str, file: &ConvertedFile) -> Self {
        let comparison = file.size_comparison.as_ref().map(|c| ComparisonView {
            original: c.original_display.clone(),
            converted: c.converted_display.clone(),
            reduction: format!("{:.1}%", c.reduction_pct),
            summary: c.summary.clone(),
            positive: c.reduction_pct > 0.0,
        });
        Self {
            name: name.to_string(),
            converted: true,
            preview: file.result.text_content.clone(),
            downloads: vec![
                DownloadView::new("⬇️ Download Markdown (.md)", &file.markdown),
                DownloadView::new("⬇️ Download Text (.txt)", &file.plain_text),
            ],
            comparison,
            friendly_error: String::new(),
            technical_error: String::new(),
        }
    }

    fn failed(name: &str, error: &FileError) -> Self {
        Self {
            name: name.to_string(),
            converted: false,
            preview: String::new(),
            downloads: Vec::new(),
            comparison: None,
            friendly_error: error.friendly_message(),
            technical_error: error.technical_detail(),
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub title: &'static str,
    pub preview_height: u32,
    pub files: Vec<FileView>,
    pub converted: usize,
    pub total: usize,
}

impl ResultsTemplate {
    pub fn new(state: &AppState, report: &BatchReport) -> Self {
        let files = report
            .files
            .iter()
            .map(|f| match &f.outcome {
                FileOutcome::Converted(c) => FileView::converted(&f.name, c),
                FileOutcome::Failed(e) => FileView::failed(&f.name, e),
            })
            .collect();
        Self {
            title: PAGE_TITLE,
            preview_height: state.config.preview_height_px,
            files,
            converted: report.stats.converted_files,
            total: report.stats.total_files,
        }
    }
}

/// `data:{mime};charset=utf-8;base64,…` for an inline download link.
pub fn data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};charset=utf-8;base64,{}", STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_roundtrips_payload() {
        let uri = data_uri("text/markdown", "# Héllo".as_bytes());
        let (head, b64) = uri.split_once(',').unwrap();
        assert_eq!(head, "data:text/markdown;charset=utf-8;base64");
        assert_eq!(STANDARD.decode(b64).unwrap(), "# Héllo".as_bytes());
    }

    #[test]
    fn failed_view_carries_both_messages() {
        let err = FileError::ConversionEngine {
            file: "x.pdf".into(),
            detail: "EOF marker not found".into(),
        };
        let view = FileView::failed("x.pdf", &err);
        assert!(!view.converted);
        assert_eq!(view.friendly_error, crate::error::FRIENDLY_ERROR);
        assert_eq!(view.technical_error, "EOF marker not found");
    }
}
