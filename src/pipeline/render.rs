//! Result rendering: turn extracted text into the preview and download payloads.
//!
//! Both downloads carry the same bytes; only the suggested name and media
//! type differ (`{basename}_converted.md` / `text/markdown` and
//! `{basename}_converted.txt` / `text/plain`).

use crate::output::{ConversionResult, ConvertedFile, Download};
use crate::pipeline::metrics;
use std::path::Path;

pub const MARKDOWN_MIME: &str = "text/markdown";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// The upload's name with its final extension removed.
///
/// Directory components sent by some browsers are dropped. An empty result
/// falls back to `document`.
pub fn basename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

/// `{base}_converted.{ext}`
pub fn converted_name(base: &str, ext: &str) -> String {
    format!("{base}_converted.{ext}")
}

/// Markdown and plain-text downloads for `text`.
pub fn downloads(filename: &str, text: &str) -> (Download, Download) {
    let base = basename(filename);
    let markdown = Download {
        file_name: converted_name(&base, "md"),
        mime_type: MARKDOWN_MIME,
        data: text.as_bytes().to_vec(),
    };
    let plain_text = Download {
        file_name: converted_name(&base, "txt"),
        mime_type: PLAIN_TEXT_MIME,
        data: text.as_bytes().to_vec(),
    };
    (markdown, plain_text)
}

/// Assemble the full payload for a successful conversion.
pub fn render(filename: &str, result: ConversionResult, with_comparison: bool) -> ConvertedFile {
    let (markdown, plain_text) = downloads(filename, &result.text_content);
    let size_comparison =
        with_comparison.then(|| metrics::compare(result.original_size, result.converted_size));
    ConvertedFile {
        result,
        markdown,
        plain_text,
        size_comparison,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(text: &str, original: u64) -> ConversionResult {
        let converted = metrics::converted_size(text);
        ConversionResult {
            text_content: text.to_string(),
            original_size: original,
            converted_size: converted,
            reduction_pct: metrics::reduction_percentage(original, converted),
        }
    }

    #[test]
    fn basename_strips_last_extension() {
        assert_eq!(basename("report.docx"), "report");
        assert_eq!(basename("q1.sales.xlsx"), "q1.sales");
        assert_eq!(basename("README"), "README");
        assert_eq!(basename("uploads/deck.pptx"), "deck");
        assert_eq!(basename(""), "document");
    }

    #[test]
    fn downloads_are_byte_identical() {
        let (md, txt) = downloads("notes.html", "# Title\n\nBody ✓\n");
        assert_eq!(md.data, txt.data);
        assert_eq!(md.file_name, "notes_converted.md");
        assert_eq!(txt.file_name, "notes_converted.txt");
        assert_eq!(md.mime_type, MARKDOWN_MIME);
        assert_eq!(txt.mime_type, PLAIN_TEXT_MIME);
    }

    #[test]
    fn render_with_and_without_comparison() {
        let with = render("a.csv", result("x,y", 10), true);
        let cmp = with.size_comparison.as_ref().unwrap();
        assert_eq!(cmp.original_size, 10);
        assert_eq!(cmp.converted_size, 3);
        assert_eq!(with.markdown.data, b"x,y");

        let without = render("a.csv", result("x,y", 10), false);
        assert!(without.size_comparison.is_none());
    }
}
