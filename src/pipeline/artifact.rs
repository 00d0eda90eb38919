//! Temporary artifacts: an upload's bytes copied to a path the engine can open.
//!
//! The engine needs a file-system path and sniffs the format from the
//! extension, so every upload is written to a uniquely named temp file that
//! keeps the original suffix. The file is owned by a [`TempArtifact`] guard
//! and deleted when the guard is dropped, on success, error or panic alike.

use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// A temp file holding a byte-for-byte copy of one upload.
///
/// Removed from disk when dropped.
#[derive(Debug)]
pub struct TempArtifact {
    file: NamedTempFile,
}

impl TempArtifact {
    /// Path of the temp file. Valid until the artifact is dropped.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, reporting any error instead of swallowing it.
    pub fn cleanup(self) -> io::Result<()> {
        self.file.close()
    }
}

/// The suffix (including the dot) to give the temp file, if `filename` has one.
pub fn suffix_for(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Write `content` to a new temp file that carries `filename`'s extension.
///
/// `content` may be empty. With `temp_dir` unset the OS temp directory is
/// used.
pub fn materialize(
    filename: &str,
    content: &[u8],
    temp_dir: Option<&Path>,
) -> io::Result<TempArtifact> {
    let suffix = suffix_for(filename);
    let mut builder = tempfile::Builder::new();
    builder.prefix("docreader-").suffix(&suffix);

    let mut file = match temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(content)?;
    file.flush()?;

    debug!(
        "Materialized '{}' ({} bytes) at {}",
        filename,
        content.len(),
        file.path().display()
    );
    Ok(TempArtifact { file })
}
