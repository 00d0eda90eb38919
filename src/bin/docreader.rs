//! CLI binary for docreader.
//!
//! A thin shim over the library crate: `serve` starts the browser UI,
//! `convert` runs the same pipeline over local files.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docreader::server::{self, AppState};
use docreader::{
    process_batch, read_upload, BatchProgressCallback, BatchReport, ConversionEngine,
    DownloadWriter, FileOutcome, MarkItDownEngine, ProgressCallback, ReaderConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the batch plus a log line per
/// file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(format!("Processing {name}…"));
    }

    fn on_file_complete(&self, index: usize, total: usize, name: &str, converted_size: u64) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{converted_size} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, converted: usize) {
        let failed = total_files.saturating_sub(converted);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} All files processed! {} converted",
                green("✔"),
                bold(&converted.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&converted.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the browser UI on http://127.0.0.1:8501
  docreader serve

  # Listen on all interfaces, custom port
  docreader serve --bind 0.0.0.0:8080

  # Convert files, print Markdown to stdout
  docreader convert report.docx

  # Write report_converted.md / .txt into ./out
  docreader convert report.docx sales.xlsx -o out/

  # JSON report (text, sizes, errors)
  docreader convert --json deck.pptx > deck.json

SUPPORTED FORMATS:
  .docx .xlsx .pptx .pdf .html .csv .json .xml

ENGINE:
  Extraction is delegated to Microsoft MarkItDown:
    pip install 'markitdown[all]'
  Use --engine / DOCREADER_ENGINE to point at another binary, and
  --engine-arg to pass extra arguments (e.g. --engine python3
  --engine-arg=-m --engine-arg=markitdown).
"#;

/// Convert office documents to Markdown in the browser or from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "docreader",
    version,
    about = "Convert Word, Excel, PowerPoint, PDF, HTML, CSV, JSON and XML files to Markdown",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Conversion engine program.
    #[arg(long, global = true, env = "DOCREADER_ENGINE", default_value = "markitdown")]
    engine: String,

    /// Extra argument for the engine (repeatable), placed before the file path.
    #[arg(long = "engine-arg", global = true, allow_hyphen_values = true)]
    engine_args: Vec<String>,

    /// Space-separated engine arguments, used when no --engine-arg is given.
    #[arg(
        long = "engine-args",
        global = true,
        hide = true,
        allow_hyphen_values = true,
        env = "DOCREADER_ENGINE_ARGS",
        value_delimiter = ' '
    )]
    engine_args_env: Vec<String>,

    /// Directory for temporary upload copies.
    #[arg(long, global = true, env = "DOCREADER_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Per-file upload limit in MB.
    #[arg(long, global = true, env = "DOCREADER_MAX_FILE_MB", default_value_t = 200)]
    max_file_mb: u64,

    /// Leave out the size-comparison summary.
    #[arg(long, global = true, env = "DOCREADER_NO_SIZE_COMPARISON")]
    no_size_comparison: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOCREADER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOCREADER_QUIET")]
    quiet: bool,
}

impl CommonArgs {
    /// `--engine-arg` values win; otherwise the split `DOCREADER_ENGINE_ARGS`.
    fn resolved_engine_args(&self) -> Vec<String> {
        let args = if self.engine_args.is_empty() {
            &self.engine_args_env
        } else {
            &self.engine_args
        };
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload page and JSON API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DOCREADER_BIND", default_value = "127.0.0.1:8501")]
        bind: String,

        /// Height of the preview area in pixels.
        #[arg(long, env = "DOCREADER_PREVIEW_HEIGHT", default_value_t = 250)]
        preview_height: u32,

        /// Whole-request body limit in MB.
        #[arg(long, env = "DOCREADER_MAX_REQUEST_MB", default_value_t = 512)]
        max_request_mb: usize,
    },

    /// Convert local files.
    Convert {
        /// Files to convert, processed in the given order.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write `{name}_converted.md` and `.txt` here instead of stdout.
        #[arg(short, long, env = "DOCREADER_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Print the batch report as JSON.
        #[arg(long, env = "DOCREADER_JSON")]
        json: bool,

        /// Disable progress bar.
        #[arg(long, env = "DOCREADER_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let show_progress = match &cli.command {
        Command::Convert {
            json, no_progress, ..
        } => !common.quiet && !no_progress && !json,
        Command::Serve { .. } => false,
    };
    let filter = if common.verbose {
        "debug"
    } else if common.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Serve {
            bind,
            preview_height,
            max_request_mb,
        } => {
            let config = base_config(common)
                .preview_height_px(*preview_height)
                .max_request_bytes(max_request_mb.saturating_mul(1024 * 1024))
                .build()
                .context("Invalid configuration")?;
            let engine: Arc<dyn ConversionEngine> =
                Arc::new(MarkItDownEngine::from_config(&config));
            let state = tokio::task::block_in_place(|| AppState::new(engine, config));

            if !common.quiet {
                eprintln!(
                    "{} {} on {}",
                    cyan("◆"),
                    bold("Universal Document Reader"),
                    bold(&format!("http://{bind}"))
                );
            }
            server::serve(bind, Arc::new(state))
                .await
                .context("Server failed")?;
        }
        Command::Convert {
            inputs,
            output_dir,
            json,
            ..
        } => {
            let progress_cb: Option<ProgressCallback> = if show_progress {
                Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
            } else {
                None
            };
            let mut builder = base_config(common);
            if let Some(cb) = progress_cb {
                builder = builder.progress_callback(cb);
            }
            let config = builder.build().context("Invalid configuration")?;
            let engine: Arc<dyn ConversionEngine> =
                Arc::new(MarkItDownEngine::from_config(&config));

            let mut uploads = Vec::with_capacity(inputs.len());
            for path in inputs {
                uploads.push(read_upload(path).await.context("Failed to read input")?);
            }

            let report = process_batch(uploads, &engine, &config).await;
            emit_report(&report, output_dir.as_ref(), *json, common.quiet).await?;

            if report.stats.failed_files > 0 {
                anyhow::bail!(
                    "{}/{} files failed to convert",
                    report.stats.failed_files,
                    report.stats.total_files
                );
            }
        }
    }

    Ok(())
}

/// Map the shared flags onto a config builder.
fn base_config(common: &CommonArgs) -> docreader::ReaderConfigBuilder {
    let mut builder = ReaderConfig::builder()
        .engine_program(common.engine.clone())
        .engine_args(common.resolved_engine_args())
        .max_file_bytes(common.max_file_mb.saturating_mul(1024 * 1024))
        .show_size_comparison(!common.no_size_comparison);
    if let Some(ref dir) = common.temp_dir {
        builder = builder.temp_dir(dir);
    }
    builder
}

/// Write `text` with a trailing newline ensured.
fn write_text(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes()).context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        out.write_all(b"\n").context("Failed to write to stdout")?;
    }
    Ok(())
}

/// Print or save the batch results.
async fn emit_report(
    report: &BatchReport,
    output_dir: Option<&PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{out}");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut writer = output_dir.map(DownloadWriter::new);
    for file in &report.files {
        match &file.outcome {
            FileOutcome::Converted(converted) => {
                if let Some(ref mut writer) = writer {
                    let written = writer
                        .save(&file.name, converted)
                        .await
                        .context("Failed to write output")?;
                    if !quiet {
                        for path in written {
                            eprintln!("  {}  {}", green("→"), path.display());
                        }
                    }
                } else {
                    write_text(&mut stdout.lock(), &converted.result.text_content)?;
                }

                if !quiet {
                    if let Some(ref cmp) = converted.size_comparison {
                        eprintln!(
                            "  {}  {} → {}  {}",
                            dim(&file.name),
                            cmp.original_display,
                            cmp.converted_display,
                            dim(&cmp.summary),
                        );
                    }
                }
            }
            FileOutcome::Failed(error) => {
                eprintln!("{} {}", red(&error.friendly_message()), dim(&file.name));
                eprintln!(
                    "  {}",
                    dim(&format!("Technical Error Details: {}", error.technical_detail()))
                );
            }
        }
    }
    Ok(())
}
