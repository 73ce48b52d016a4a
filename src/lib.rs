//! # pdf2report
//!
//! Analyze PDF documents with Gemini and export the result as a printable
//! PDF report.
//!
//! ## Why this crate?
//!
//! Reading a long contract, report, or paper to answer "what does this say?"
//! is a language-model problem, but wiring a document picker to a model API
//! involves more than one request: the text has to come out of the PDF, the
//! prompt has to fit a context budget, the API key must never leave the
//! user's control, and the answer has to look good both on screen and on
//! paper. This crate packages that whole path, plus the small proxy endpoint
//! that keeps the provider API behind an owned URL.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate magic bytes and the 100 MB cap
//!  ├─ 2. Extract  per-page text via lopdf, pages joined by a blank line
//!  ├─ 3. Prompt   one of four Spanish templates + capped document text
//!  ├─ 4. Model    sequential fallback chain through the owned proxy
//!  ├─ 5. Format   screen sections (HTML) — or —
//!  └─ 6. Report   paginated A4 PDF with title, metadata and footers
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2report::{analyze_path, AnalysisConfig, AnalysisType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .analysis_type(AnalysisType::Summary)
//!         .build()?;
//!     let output = analyze_path("informe.pdf", &config).await?;
//!     println!("{}", output.analysis);
//!     let report = pdf2report::pipeline::report::render_report(&output)?;
//!     std::fs::write("analisis.pdf", report)?;
//!     Ok(())
//! }
//! ```
//!
//! The analysis posts to the proxy at `http://127.0.0.1:8787/api/gemini` by
//! default; run one with `pdf2report serve` or point
//! [`AnalysisConfigBuilder::endpoint`](config::AnalysisConfigBuilder::endpoint)
//! somewhere else.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2report` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2report = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod server;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_path, analyze_sync, inspect};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, AnalysisType};
pub use error::{AnalyzeError, ModelError};
pub use output::{AnalysisOutput, AnalysisStats, DocumentInfo, ModelAttempt};
pub use pipeline::input::{load_document, Document};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{AnalysisSession, SessionState};
