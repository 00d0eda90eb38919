//! Size metrics: converted size, reduction percentage and human-readable units.

use crate::output::SizeComparison;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Byte length of `text` under UTF-8.
pub fn converted_size(text: &str) -> u64 {
    text.len() as u64
}

/// `(original - converted) / original * 100`.
///
/// Negative when the text is larger than the source. An empty original is
/// defined as 0% rather than a division by zero.
pub fn reduction_percentage(original: u64, converted: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - converted as f64) / original as f64 * 100.0
}

/// Render a byte count as `N bytes`, `N.NN KB` or `N.NN MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} bytes")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// One-line note on the size change.
pub fn summarize(reduction_pct: f64) -> String {
    if reduction_pct > 0.0 {
        format!("Efficiency: the text is {reduction_pct:.1}% smaller than the original file.")
    } else if reduction_pct < 0.0 {
        format!(
            "The text is {:.1}% larger than the original file.",
            reduction_pct.abs()
        )
    } else {
        "No size reduction.".to_string()
    }
}

/// Build the full comparison payload.
pub fn compare(original: u64, converted: u64) -> SizeComparison {
    let reduction_pct = reduction_percentage(original, converted);
    SizeComparison {
        original_size: original,
        converted_size: converted,
        reduction_pct,
        original_display: format_size(original),
        converted_display: format_size(converted),
        summary: summarize(reduction_pct),
    }
}
