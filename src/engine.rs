//! The conversion engine boundary.
//!
//! Format detection and text extraction are not done in this crate. They are
//! delegated to an engine behind [`ConversionEngine`], which takes a file
//! path and returns the extracted Markdown or an [`EngineError`]. The
//! pipeline never inspects an engine error beyond its `Display` text.
//!
//! [`MarkItDownEngine`] is the production implementation: it runs the
//! `markitdown` command-line program on the temp file and captures stdout.
//! Tests substitute their own engines.

use crate::config::ReaderConfig;
use crate::error::EngineError;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Text produced by an engine for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub text_content: String,
}

impl EngineOutput {
    pub fn new(text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
        }
    }
}

/// Extracts a textual/Markdown representation from a file on disk.
///
/// Implementations are called from a blocking thread, one file at a time,
/// and must not assume the path outlives the call.
pub trait ConversionEngine: Send + Sync {
    /// Short engine name used in logs and `/health`.
    fn name(&self) -> &str;

    /// Probe whether the engine is usable. Called once at startup.
    fn check(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Convert the file at `path`. The file extension is the format hint.
    fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError>;
}

/// Runs the `markitdown` CLI (or a compatible program) as a subprocess.
#[derive(Debug, Clone)]
pub struct MarkItDownEngine {
    program: String,
    args: Vec<String>,
}

impl MarkItDownEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from [`ReaderConfig::engine_program`] and [`ReaderConfig::engine_args`].
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.engine_program.clone(), config.engine_args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, extra: &[&OsStr]) -> Result<Vec<u8>, EngineError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| EngineError::Launch {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} failed: {}", self.program, stderr);
            return Err(EngineError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

impl Default for MarkItDownEngine {
    fn default() -> Self {
        Self::new("markitdown", Vec::new())
    }
}

impl ConversionEngine for MarkItDownEngine {
    fn name(&self) -> &str {
        "markitdown"
    }

    fn check(&self) -> Result<(), EngineError> {
        let out = self.run(&[OsStr::new("--version")])?;
        debug!(
            "{} available: {}",
            self.program,
            String::from_utf8_lossy(&out).trim()
        );
        Ok(())
    }

    fn convert(&self, path: &Path) -> Result<EngineOutput, EngineError> {
        debug!("Running {} on {}", self.program, path.display());
        let stdout = self.run(&[path.as_os_str()])?;
        let text =
            String::from_utf8(stdout).map_err(|e| EngineError::InvalidOutput(e.to_string()))?;
        Ok(EngineOutput::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_program_is_launch_error() {
        let engine = MarkItDownEngine::new("docreader-no-such-program", vec![]);
        let err = engine.convert(Path::new("/tmp/x.pdf")).unwrap_err();
        assert!(matches!(err, EngineError::Launch { .. }), "got: {err:?}");
        assert!(engine.check().is_err());
    }

    #[test]
    fn from_config_copies_program_and_args() {
        let config = ReaderConfig::builder()
            .engine_program("python3")
            .engine_args(["-m", "markitdown"])
            .build()
            .unwrap();
        let engine = MarkItDownEngine::from_config(&config);
        assert_eq!(engine.program(), "python3");
        assert_eq!(engine.args, vec!["-m", "markitdown"]);
    }

    #[cfg(unix)]
    #[test]
    fn stdout_becomes_text_content() {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        tmp.write_all(b"a,b\n1,2\n").unwrap();

        let engine = MarkItDownEngine::new("cat", vec![]);
        let out = engine.convert(tmp.path()).unwrap();
        assert_eq!(out.text_content, "a,b\n1,2\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failed_error() {
        let engine = MarkItDownEngine::new("false", vec![]);
        let err = engine.convert(Path::new("whatever.docx")).unwrap_err();
        assert!(matches!(err, EngineError::Failed { .. }), "got: {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_is_rejected() {
        let mut tmp = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        tmp.write_all(&[0xff, 0xfe, 0x00]).unwrap();

        let engine = MarkItDownEngine::new("cat", vec![]);
        let err = engine.convert(tmp.path()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOutput(_)), "got: {err:?}");
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(unix)]
    #[test]
    fn failed_exit_is_not_logged_above_debug() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let engine = MarkItDownEngine::new("false", vec![]);
        let result =
            tracing::subscriber::with_default(subscriber, || engine.convert(Path::new("x.docx")));

        assert!(result.is_err());
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.is_empty(), "unexpected log output: {output}");
    }
}
