//! Pipeline stages for one uploaded file.
//!
//! Each submodule implements one step; [`crate::convert`] strings them
//! together and owns the error boundary.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ artifact ──▶ engine ──▶ metrics ──▶ render ──▶ cleanup
//! (bytes)    (temp file)  (text)     (sizes)     (payload)  (drop guard)
//! ```
//!
//! 1. [`artifact`]: write the upload to a temp file with its extension;
//!    the guard deletes it on drop
//! 2. [`crate::engine`]: external text extraction (not a submodule here)
//! 3. [`metrics`] : converted size, reduction percentage, display units
//! 4. [`render`]  : preview text, `.md` / `.txt` downloads, size summary

pub mod artifact;
pub mod metrics;
pub mod render;
