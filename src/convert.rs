//! Batch conversion entry points.
//!
//! [`process_batch`] walks the uploads in submission order and hands each one
//! to [`process_file`], which is the per-file error boundary: every failure
//! (size limit, temp-file write, engine fault, engine panic) ends up inside
//! the returned [`FileReport`] and never reaches the loop.
//!
//! Per-file state machine:
//!
//! ```text
//! Received ──▶ Materialized ──▶ Converted ──▶ Rendered ──▶ CleanedUp
//!     │              │               │                         ▲
//!     └─ rejected    └───── engine error / panic ──────────────┘
//! ```

use crate::config::ReaderConfig;
use crate::engine::{ConversionEngine, EngineOutput};
use crate::error::{DocReaderError, EngineError, FileError};
use crate::output::{
    BatchReport, BatchStats, ConversionResult, ConvertedFile, FileOutcome, FileReport,
    UploadedFile,
};
use crate::pipeline::{artifact, metrics, render};
use std::any::Any;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every upload in `uploads`, one at a time, in order.
///
/// Always returns a report with one entry per upload. Progress events go to
/// `config.progress_callback` when set.
pub async fn process_batch(
    uploads: Vec<UploadedFile>,
    engine: &Arc<dyn ConversionEngine>,
    config: &ReaderConfig,
) -> BatchReport {
    let start = Instant::now();
    let total = uploads.len();
    info!("Processing batch of {} file(s) with {}", total, engine.name());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut stats = BatchStats {
        total_files: total,
        ..BatchStats::default()
    };
    let mut files = Vec::with_capacity(total);

    for (index, upload) in uploads.into_iter().enumerate() {
        let name = upload.name.clone();
        stats.total_original_bytes += upload.original_size();

        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &name);
        }

        let report = process_file(upload, engine, config).await;

        match &report.outcome {
            FileOutcome::Converted(c) => {
                stats.converted_files += 1;
                stats.total_converted_bytes += c.result.converted_size;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(index, total, &name, c.result.converted_size);
                }
            }
            FileOutcome::Failed(e) => {
                stats.failed_files += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(index, total, &name, &e.to_string());
                }
            }
        }
        files.push(report);
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} converted, {}ms",
        stats.converted_files, total, stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.converted_files);
    }

    BatchReport { files, stats }
}

/// Convert a single upload.
///
/// The temp artifact is created before the engine runs and removed before
/// this function returns, whatever the outcome.
pub async fn process_file(
    upload: UploadedFile,
    engine: &Arc<dyn ConversionEngine>,
    config: &ReaderConfig,
) -> FileReport {
    let name = upload.name.clone();
    let outcome = match convert_upload(upload, engine, config).await {
        Ok(converted) => FileOutcome::Converted(Box::new(converted)),
        Err(e) => {
            warn!("{}", e);
            FileOutcome::Failed(e)
        }
    };
    FileReport { name, outcome }
}

async fn convert_upload(
    upload: UploadedFile,
    engine: &Arc<dyn ConversionEngine>,
    config: &ReaderConfig,
) -> Result<ConvertedFile, FileError> {
    let UploadedFile { name, content, .. } = upload;
    let original_size = content.len() as u64;

    // ── Received ─────────────────────────────────────────────────────────
    if original_size > config.max_file_bytes {
        return Err(FileError::UploadRejected {
            file: name,
            size: original_size,
            limit: config.max_file_bytes,
        });
    }

    // ── Materialized ─────────────────────────────────────────────────────
    let temp = artifact::materialize(&name, &content, config.temp_dir.as_deref()).map_err(|e| {
        FileError::UploadPersistence {
            file: name.clone(),
            detail: e.to_string(),
        }
    })?;
    drop(content);

    // ── Converted ────────────────────────────────────────────────────────
    let engine_result = run_engine(engine, temp.path()).await;

    // ── CleanedUp ────────────────────────────────────────────────────────
    let temp_path = temp.path().to_path_buf();
    if let Err(e) = temp.cleanup() {
        warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
    } else {
        debug!("Removed temp file {}", temp_path.display());
    }

    let text_content = engine_result
        .map_err(|e| FileError::ConversionEngine {
            file: name.clone(),
            detail: e.to_string(),
        })?
        .text_content;

    // ── Rendered ─────────────────────────────────────────────────────────
    let converted_size = metrics::converted_size(&text_content);
    let result = ConversionResult {
        text_content,
        original_size,
        converted_size,
        reduction_pct: metrics::reduction_percentage(original_size, converted_size),
    };
    info!(
        "Converted '{}': {} → {} bytes",
        name, original_size, converted_size
    );

    Ok(render::render(&name, result, config.show_size_comparison))
}

/// Run the engine on the blocking pool, turning a panic into an error.
async fn run_engine(
    engine: &Arc<dyn ConversionEngine>,
    path: &Path,
) -> Result<EngineOutput, EngineError> {
    let engine = Arc::clone(engine);
    let path = path.to_path_buf();
    match tokio::task::spawn_blocking(move || engine.convert(&path)).await {
        Ok(result) => result,
        Err(join_err) if join_err.is_panic() => {
            Err(EngineError::Crashed(panic_message(join_err.into_panic())))
        }
        Err(join_err) => Err(EngineError::Crashed(join_err.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Synchronous wrapper around [`process_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_batch_sync(
    uploads: Vec<UploadedFile>,
    engine: &Arc<dyn ConversionEngine>,
    config: &ReaderConfig,
) -> Result<BatchReport, DocReaderError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| DocReaderError::Internal(format!("Failed to create tokio runtime: {}", e)))?;
    Ok(runtime.block_on(process_batch(uploads, engine, config)))
}

/// Read a local file into an [`UploadedFile`] named after its file name.
pub async fn read_upload(path: impl AsRef<Path>) -> Result<UploadedFile, DocReaderError> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocReaderError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DocReaderError::InputReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let size = content.len() as u64;
    Ok(UploadedFile::new(name, content).with_declared_size(size))
}

/// Write both downloads of `converted` into `dir`.
///
/// Uses atomic writes (temp file + rename) so a partial file never appears
/// under the final name. Returns the written paths, Markdown first.
///
/// Existing files with the same names are replaced. Use [`DownloadWriter`]
/// when saving several files of one batch into the same directory.
pub async fn save_downloads(
    converted: &ConvertedFile,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, DocReaderError> {
    let dir = dir.as_ref();
    create_output_dir(dir).await?;

    let mut written = Vec::with_capacity(2);
    for download in [&converted.markdown, &converted.plain_text] {
        written.push(write_atomic(dir, &download.file_name, &download.data).await?);
    }
    Ok(written)
}

/// Saves the downloads of a whole batch into one directory.
///
/// Two uploads with the same stem (`a.docx`, `a.pdf`) would both map to
/// `a_converted.md`. The first keeps the plain name; later ones are
/// qualified with their source extension (`a.pdf_converted.md`), then with a
/// counter (`a.pdf-2_converted.md`), so no result overwrites another.
#[derive(Debug)]
pub struct DownloadWriter {
    dir: PathBuf,
    taken: HashSet<String>,
}

impl DownloadWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            taken: HashSet::new(),
        }
    }

    /// Write both downloads of `converted`, uploaded as `source_name`.
    ///
    /// Returns the written paths, Markdown first.
    pub async fn save(
        &mut self,
        source_name: &str,
        converted: &ConvertedFile,
    ) -> Result<Vec<PathBuf>, DocReaderError> {
        create_output_dir(&self.dir).await?;

        let (md_name, txt_name) = self.claim(
            source_name,
            &converted.markdown.file_name,
            &converted.plain_text.file_name,
        );

        let md = write_atomic(&self.dir, &md_name, &converted.markdown.data).await?;
        let txt = write_atomic(&self.dir, &txt_name, &converted.plain_text.data).await?;
        Ok(vec![md, txt])
    }

    /// Pick names for one file's downloads that no earlier file has used.
    fn claim(&mut self, source_name: &str, md: &str, txt: &str) -> (String, String) {
        let free = |taken: &HashSet<String>, md: &str, txt: &str| {
            !taken.contains(md) && !taken.contains(txt)
        };

        let (md, txt) = if free(&self.taken, md, txt) {
            (md.to_string(), txt.to_string())
        } else {
            let qualified = Path::new(source_name)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| render::basename(source_name));

            let mut attempt = 1usize;
            loop {
                let stem = if attempt == 1 {
                    qualified.clone()
                } else {
                    format!("{qualified}-{attempt}")
                };
                let md_candidate = render::converted_name(&stem, "md");
                let txt_candidate = render::converted_name(&stem, "txt");
                if free(&self.taken, &md_candidate, &txt_candidate) {
                    warn!(
                        "'{}' clashes with an earlier output name; saving as {}",
                        source_name, md_candidate
                    );
                    break (md_candidate, txt_candidate);
                }
                attempt += 1;
            }
        };

        self.taken.insert(md.clone());
        self.taken.insert(txt.clone());
        (md, txt)
    }
}

async fn create_output_dir(dir: &Path) -> Result<(), DocReaderError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Write `data` to `dir/name` through `dir/name.part` and a rename.
async fn write_atomic(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf, DocReaderError> {
    let path = dir.join(name);
    let tmp_path = dir.join(format!("{name}.part"));

    tokio::fs::write(&tmp_path, data)
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| DocReaderError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperEngine;

    impl ConversionEngine for UpperEngine {
        fn name(&self) -> &str {
            "upper"
        }

        fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError> {
            let bytes = std::fs::read(path).map_err(|e| EngineError::Other(e.to_string()))?;
            Ok(EngineOutput::new(String::from_utf8_lossy(&bytes).to_uppercase()))
        }
    }

    struct PanickingEngine;

    impl ConversionEngine for PanickingEngine {
        fn name(&self) -> &str {
            "panics"
        }

        fn convert(&self, _path: &Path) -> Result<EngineOutput, EngineError> {
            panic!("parser blew up");
        }
    }

    fn config(dir: &Path) -> ReaderConfig {
        ReaderConfig::builder().temp_dir(dir).build().unwrap()
    }

    #[tokio::test]
    async fn converts_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn ConversionEngine> = Arc::new(UpperEngine);
        let report = process_file(
            UploadedFile::new("a.csv", b"x,y".to_vec()),
            &engine,
            &config(dir.path()),
        )
        .await;

        let converted = report.converted().expect("should convert");
        assert_eq!(converted.result.text_content, "X,Y");
        assert_eq!(converted.result.converted_size, 3);
        assert_eq!(converted.result.reduction_pct, 0.0);
    }

    #[tokio::test]
    async fn engine_panic_becomes_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn ConversionEngine> = Arc::new(PanickingEngine);
        let report = process_file(
            UploadedFile::new("deck.pptx", b"PK".to_vec()),
            &engine,
            &config(dir.path()),
        )
        .await;

        match report.error() {
            Some(FileError::ConversionEngine { detail, .. }) => {
                assert!(detail.contains("parser blew up"), "got: {detail}")
            }
            other => panic!("expected engine error, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_before_materializing() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn ConversionEngine> = Arc::new(UpperEngine);
        let cfg = ReaderConfig::builder()
            .temp_dir(dir.path())
            .max_file_bytes(4)
            .build()
            .unwrap();
        let upload = UploadedFile::new("big.json", b"{\"a\":1}".to_vec());
        let report = process_file(upload, &engine, &cfg).await;

        assert!(matches!(
            report.error(),
            Some(FileError::UploadRejected { size: 7, limit: 4, .. })
        ));
    }

    #[test]
    fn panic_message_handles_both_payload_kinds() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic");
    }

    #[tokio::test]
    async fn read_upload_missing_file() {
        let err = read_upload("/definitely/not/here.docx").await.unwrap_err();
        assert!(matches!(err, DocReaderError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn save_downloads_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn ConversionEngine> = Arc::new(UpperEngine);
        let report = process_file(
            UploadedFile::new("notes.html", b"hello".to_vec()),
            &engine,
            &config(dir.path()),
        )
        .await;
        let converted = report.converted().unwrap();

        let out = dir.path().join("out");
        let paths = save_downloads(converted, &out).await.unwrap();
        assert_eq!(paths[0], out.join("notes_converted.md"));
        assert_eq!(paths[1], out.join("notes_converted.txt"));
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"HELLO");
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"HELLO");
    }

    #[test]
    fn writer_claims_distinct_names_for_same_stem() {
        let mut writer = DownloadWriter::new("unused");
        assert_eq!(
            writer.claim("a.docx", "a_converted.md", "a_converted.txt"),
            ("a_converted.md".to_string(), "a_converted.txt".to_string())
        );
        assert_eq!(
            writer.claim("a.pdf", "a_converted.md", "a_converted.txt"),
            ("a.pdf_converted.md".to_string(), "a.pdf_converted.txt".to_string())
        );
        assert_eq!(
            writer.claim("dir/a.pdf", "a_converted.md", "a_converted.txt"),
            ("a.pdf-2_converted.md".to_string(), "a.pdf-2_converted.txt".to_string())
        );
    }
}
