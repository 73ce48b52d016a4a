//! CLI binary for pdf2report.
//!
//! A thin shim over the library crate: `analyze` maps flags to
//! `AnalysisConfig` and prints or exports results, `serve` runs the proxy
//! endpoint, `inspect` prints document facts without a key.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2report::server::{self, ProxyState};
use pdf2report::{
    analyze_path, inspect, AnalysisConfig, AnalysisProgressCallback, AnalysisType,
    ProgressCallback,
};
use pdf2report::pipeline::report;
use std::io::{self, Write};
use std::net::SocketAddr;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal spinner reflecting the pipeline phase: extraction, then one
/// message per candidate model, then done.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Analyzing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self) {
        self.bar.set_message("extracting text…");
    }

    fn on_extraction_complete(&self, pages: usize, chars: usize) {
        self.bar.println(format!(
            "  {} {} pages  {}",
            green("✓"),
            pages,
            dim(&format!("{chars} chars extracted")),
        ));
    }

    fn on_model_attempt(&self, model: &str, index: usize, total: usize) {
        self.bar
            .set_message(format!("model {model} ({}/{total})", index + 1));
    }

    fn on_model_failed(&self, model: &str, error: &str) {
        let msg = truncate_message(error, 80);
        self.bar
            .println(format!("  {} {model}  {}", red("✗"), red(&msg)));
    }

    fn on_analysis_complete(&self, model: &str, chars: usize) {
        self.bar.println(format!(
            "  {} {model}  {}",
            green("✓"),
            dim(&format!("{chars} chars of analysis")),
        ));
    }
}

/// Cap a message at `max` characters, appending an ellipsis when cut.
///
/// Counts characters, not bytes — upstream error messages can carry
/// non-ASCII text and a byte-indexed slice could split a character.
fn truncate_message(message: &str, max: usize) -> String {
    if message.chars().count() > max {
        let cut: String = message.chars().take(max - 1).collect();
        format!("{cut}\u{2026}")
    } else {
        message.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a document (analysis text to stdout)
  pdf2report analyze informe.pdf --type summary

  # Export the printable PDF report
  pdf2report analyze informe.pdf --type keypoints -o analisis.pdf

  # Structured JSON output with run statistics
  pdf2report analyze informe.pdf --json > result.json

  # Try several models in order
  pdf2report analyze informe.pdf --model gemini-2.0-flash --model gemini-1.5-flash

  # Run the proxy endpoint the analysis talks to
  pdf2report serve --port 8787

  # Inspect a PDF (no API key needed)
  pdf2report inspect informe.pdf

ANALYSIS TYPES:
  general     Full analysis: summary, themes, conclusions, assessment
  summary     Concise executive summary with key bullet points
  keypoints   The most important points, grouped and ordered
  qa          Questions a reader would ask, answered from the document

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Google Gemini API key (forwarded per request, never stored)

SETUP:
  1. Start the proxy:   pdf2report serve &
  2. Set the key:       export GEMINI_API_KEY=AIza...
  3. Analyze:           pdf2report analyze document.pdf --type summary
"#;

/// Analyze PDF documents with Gemini and export printable reports.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2report",
    version,
    about = "Analyze PDF documents with Gemini and export printable PDF reports",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2REPORT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a PDF document.
    Analyze {
        /// Local PDF file path.
        input: PathBuf,

        /// Write the printable PDF report here instead of printing the
        /// analysis text. Use "-o auto" for the suggested filename.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gemini API key (prefer the environment variable).
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Analysis type: general, summary, keypoints, qa.
        #[arg(long = "type", value_enum, default_value = "general")]
        analysis_type: AnalysisTypeArg,

        /// Candidate model, repeatable; tried in order.
        #[arg(long = "model")]
        models: Vec<String>,

        /// Proxy endpoint URL.
        #[arg(long, env = "PDF2REPORT_ENDPOINT")]
        endpoint: Option<String>,

        /// Output structured JSON (AnalysisOutput) instead of text.
        #[arg(long)]
        json: bool,

        /// Output the on-screen HTML fragment instead of plain text.
        #[arg(long, conflicts_with = "json")]
        html: bool,

        /// Disable the progress spinner.
        #[arg(long, env = "PDF2REPORT_NO_PROGRESS")]
        no_progress: bool,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 60)]
        api_timeout: u64,
    },

    /// Run the credential-forwarding proxy endpoint.
    Serve {
        /// Host address to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value_t = 8787)]
        port: u16,

        /// Upstream API base URL.
        #[arg(long, default_value = server::GEMINI_API_BASE)]
        upstream: String,
    },

    /// Print PDF facts (pages, version, encryption), no API key needed.
    Inspect {
        /// Local PDF file path.
        input: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AnalysisTypeArg {
    General,
    Summary,
    Keypoints,
    Qa,
}

impl From<AnalysisTypeArg> for AnalysisType {
    fn from(v: AnalysisTypeArg) -> Self {
        match v {
            AnalysisTypeArg::General => AnalysisType::General,
            AnalysisTypeArg::Summary => AnalysisType::Summary,
            AnalysisTypeArg::Keypoints => AnalysisType::Keypoints,
            AnalysisTypeArg::Qa => AnalysisType::Qa,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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

    match cli.command {
        Command::Analyze {
            input,
            output,
            api_key,
            analysis_type,
            models,
            endpoint,
            json,
            html,
            no_progress,
            api_timeout,
        } => {
            run_analyze(AnalyzeArgs {
                input,
                output,
                api_key,
                analysis_type: analysis_type.into(),
                models,
                endpoint,
                json,
                html,
                show_progress: !cli.quiet && !no_progress && !json,
                api_timeout,
                quiet: cli.quiet,
            })
            .await
        }
        Command::Serve {
            host,
            port,
            upstream,
        } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("Invalid bind address {host}:{port}"))?;
            server::serve(addr, ProxyState::new().with_upstream(upstream))
                .await
                .context("Proxy server failed")
        }
        Command::Inspect { input, json } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let info = inspect(&bytes).context("Failed to inspect PDF")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
                );
            } else {
                println!("File:         {}", input.display());
                println!("Pages:        {}", info.page_count);
                println!("PDF Version:  {}", info.pdf_version);
                println!("Encrypted:    {}", info.encrypted);
            }
            Ok(())
        }
    }
}

struct AnalyzeArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    api_key: String,
    analysis_type: AnalysisType,
    models: Vec<String>,
    endpoint: Option<String>,
    json: bool,
    html: bool,
    show_progress: bool,
    api_timeout: u64,
    quiet: bool,
}

async fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let progress = if args.show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };

    let mut builder = AnalysisConfig::builder()
        .api_key(args.api_key)
        .analysis_type(args.analysis_type)
        .api_timeout_secs(args.api_timeout);
    if !args.models.is_empty() {
        builder = builder.models(args.models.clone());
    }
    if let Some(ref endpoint) = args.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    let result = analyze_path(&args.input, &config).await;
    if let Some(ref cb) = progress {
        cb.finish();
    }
    let output = result.context("Analysis failed")?;

    if let Some(output_path) = args.output {
        // "-o auto" resolves to the suggested filename in the current dir.
        let path = if output_path.as_os_str() == "auto" {
            PathBuf::from(report::report_filename(&output))
        } else {
            output_path
        };
        let bytes = report::render_report(&output).context("Report rendering failed")?;
        report::write_report(&path, &bytes).context("Report write failed")?;
        if !args.quiet {
            eprintln!(
                "{}  {} pages analysed  {}ms  →  {}",
                green("✔"),
                output.stats.page_count,
                output.stats.total_duration_ms,
                bold(&path.display().to_string()),
            );
        }
        return Ok(());
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else {
        let text = if args.html {
            pdf2report::pipeline::format::format_html(&output.analysis)
        } else {
            output.analysis.clone()
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        if !text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if !args.quiet && !args.json {
        eprintln!(
            "   {}  {}  —  {}ms total",
            dim(&output.model),
            dim(&format!(
                "{} pages, {} chars{}",
                output.stats.page_count,
                output.stats.extracted_chars,
                if output.stats.truncated { ", truncated" } else { "" }
            )),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_message("HTTP 429", 80), "HTTP 429");
    }

    #[test]
    fn long_messages_are_cut_with_an_ellipsis() {
        let long = "x".repeat(120);
        let cut = truncate_message(&long, 80);
        assert_eq!(cut.chars().count(), 80);
        assert!(cut.ends_with('\u{2026}'));
    }

    #[test]
    fn truncation_never_splits_a_character() {
        // Multi-byte characters around the cut point must not panic.
        let long = "código de país inválido: España — ".repeat(10);
        let cut = truncate_message(&long, 80);
        assert_eq!(cut.chars().count(), 80);
    }
}
