//! CLI binary for edgequake-pdf2quiz.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2quiz::config::{API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use edgequake_pdf2quiz::{
    checkpoint_path, extract_pdf, ExtractionConfig, ExtractionProgressCallback, ExtractionSummary,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the page currently in flight.
    page_started: Mutex<Option<Instant>>,
    /// Pages that produced no questions.
    empty: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner-only until `on_run_start` reports the page range.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            empty: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, remaining: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(remaining as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, first_page: usize, total_pages: usize) {
        let remaining = (total_pages + 1).saturating_sub(first_page);
        self.activate_bar(remaining);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Extracting pages {first_page}–{total_pages} ({remaining} to go)…"
            ))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, question_count: usize) {
        let elapsed = self.page_elapsed_secs();
        let mark = if question_count > 0 {
            green("✓")
        } else {
            self.empty.fetch_add(1, Ordering::SeqCst);
            yellow("·")
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<14}  {}",
            mark,
            page_num,
            total_pages,
            dim(&format!("{question_count:>3} questions")),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, pages_processed: usize, total_questions: usize) {
        self.bar.finish_and_clear();
        let empty = self.empty.load(Ordering::SeqCst);
        eprintln!(
            "{} {} questions after {} pages  {}",
            green("✔"),
            bold(&total_questions.to_string()),
            pages_processed,
            dim(&format!("({empty} pages without questions)")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract from page 19 onwards into questions.json
  pdf2quiz guide.pdf

  # Whole document, custom output location
  pdf2quiz --start-page 1 guide.pdf -o public/questions.json

  # Another OpenAI-compatible endpoint and model
  pdf2quiz --endpoint http://localhost:8000/v1/chat/completions \
           --model my-vision-model guide.pdf

  # Machine-readable summary
  pdf2quiz --json --no-progress guide.pdf > summary.json

RESUMING:
  After every page the accumulated questions are written to
  <OUTPUT>.checkpoint. Re-running with the same output path resumes after
  the last completed page. Delete the checkpoint to start over.

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY      API key for the chat-completions endpoint
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Log filter (overrides -v / -q)

  A .env file in the working directory is loaded before arguments are read.
"#;

/// Extract multiple-choice questions from PDF study guides using a Vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Extract multiple-choice exam questions from PDFs using a Vision LLM",
    long_about = "Render each page of a PDF, ask a vision model to read the multiple-choice \
questions on it, and collect them into a single JSON array. Progress is checkpointed after \
every page so an interrupted run can be resumed.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the question array to this file.
    #[arg(short, long, env = "PDF2QUIZ_OUTPUT", default_value = "questions.json")]
    output: PathBuf,

    /// First page to process (1-indexed) when no checkpoint exists.
    #[arg(long, env = "PDF2QUIZ_START_PAGE", default_value_t = 19,
          value_parser = clap::value_parser!(u32).range(1..))]
    start_page: u32,

    /// API key for the chat-completions endpoint.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: String,

    /// Vision model ID.
    #[arg(long, env = "PDF2QUIZ_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat-completions endpoint URL.
    #[arg(long, env = "PDF2QUIZ_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Pause after each page, in milliseconds.
    #[arg(long, env = "PDF2QUIZ_PAGE_DELAY_MS", default_value_t = 1000)]
    page_delay_ms: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2QUIZ_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long, env = "PDF2QUIZ_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2QUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2QUIZ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` must be loaded before clap reads env-backed flags.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar already shows one line per page.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let summary = extract_pdf(&cli.input, &cli.output, &config)
        .await
        .with_context(|| format!("Extraction failed for {}", cli.input.display()))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        print_summary(&cli, &summary);
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .api_key(&cli.api_key)
        .endpoint(&cli.endpoint)
        .model(&cli.model)
        .start_page(cli.start_page as usize)
        .page_delay_ms(cli.page_delay_ms);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(cli: &Cli, summary: &ExtractionSummary) {
    eprintln!(
        "{}  pages {}–{}  +{} questions  ({} total)  {}ms  →  {}",
        green("✔"),
        summary.first_page,
        summary.total_pages,
        summary.questions_added,
        summary.total_questions,
        summary.duration_ms,
        bold(&cli.output.display().to_string()),
    );
    let origin = serde_json::to_value(summary.checkpoint)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    eprintln!(
        "   {}",
        dim(&format!(
            "checkpoint ({origin}): {}",
            checkpoint_path(&cli.output).display()
        )),
    );
}
