//! Analysis entry points.
//!
//! [`analyze`] runs the full pipeline against an in-memory document:
//! extract the text, build the prompt, drive the model fallback chain
//! through the proxy, and assemble the [`AnalysisOutput`]. The steps are
//! strictly sequential; there is nothing to parallelise in a single-document
//! run and the ordering guarantees the credential is only used after the
//! document has proven analysable.

use crate::config::AnalysisConfig;
use crate::error::AnalyzeError;
use crate::output::{AnalysisOutput, AnalysisStats, DocumentInfo};
use crate::pipeline::{extract, input, llm};
use crate::prompts;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Analyze a validated PDF document.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`AnalyzeError::MissingApiKey`] before any work is done
/// - [`AnalyzeError::ExtractionFailed`] / [`AnalyzeError::EmptyExtraction`]
///   before any network request is made
/// - [`AnalyzeError::AllModelsFailed`] when every candidate model fails
pub async fn analyze(
    document: &input::Document,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzeError> {
    let total_start = Instant::now();
    if config.api_key.is_empty() {
        return Err(AnalyzeError::MissingApiKey);
    }
    info!("Starting {} analysis of '{}'", config.analysis_type, document.name);

    // ── Step 1: Extract text ─────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start();
    }
    let extract_start = Instant::now();
    let extracted = extract::extract_text(&document.bytes)?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} chars from {} pages in {}ms",
        extracted.text.len(),
        extracted.page_count,
        extract_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(extracted.page_count, extracted.text.chars().count());
    }

    // Scanned or image-only documents are caught here, before the
    // credential is ever sent anywhere.
    if extracted.text.trim().is_empty() {
        return Err(AnalyzeError::EmptyExtraction);
    }

    // ── Step 2: Build the prompt ─────────────────────────────────────────
    let (prompt, truncated) = prompts::build_prompt(
        config.analysis_type,
        &extracted.text,
        config.prompt_char_limit,
    );
    if truncated {
        debug!(
            "Document text truncated to {} chars for the prompt",
            config.prompt_char_limit
        );
    }

    // ── Step 3: Run the model fallback chain ─────────────────────────────
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| AnalyzeError::Internal(format!("HTTP client setup failed: {e}")))?;

    let llm_start = Instant::now();
    let answer = llm::run_fallback(&client, config, &prompt).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    info!(
        "Model {} answered with {} chars in {}ms",
        answer.model,
        answer.text.len(),
        llm_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_analysis_complete(&answer.model, answer.text.chars().count());
    }

    // ── Step 4: Assemble the output ──────────────────────────────────────
    Ok(AnalysisOutput {
        analysis: answer.text,
        model: answer.model,
        analysis_type: config.analysis_type,
        source_name: document.name.clone(),
        stats: AnalysisStats {
            page_count: extracted.page_count,
            extracted_chars: extracted.text.chars().count(),
            truncated,
            attempts: answer.attempts,
            extract_duration_ms,
            llm_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        },
    })
}

/// Load a PDF from disk and analyze it.
pub async fn analyze_path(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzeError> {
    let document = input::load_document(path.as_ref())?;
    analyze(&document, config).await
}

/// Blocking wrapper around [`analyze`] for synchronous callers.
pub fn analyze_sync(
    document: &input::Document,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, AnalyzeError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzeError::Internal(format!("Failed to create async runtime: {e}")))?;
    runtime.block_on(analyze(document, config))
}

/// Read document facts from PDF bytes without analysing (no API key needed).
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, AnalyzeError> {
    extract::inspect_document(bytes)
}
