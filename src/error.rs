//! Error types for the pdf2report library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalyzeError`] — **Fatal**: the analysis cannot proceed at all
//!   (invalid document, missing API key, every candidate model failed).
//!   Returned as `Err(AnalyzeError)` from the top-level `analyze*` functions
//!   and from [`crate::session::AnalysisSession`] operations.
//!
//! * [`ModelError`] — **Non-fatal**: a single candidate model failed
//!   (transport error, non-2xx proxy status, malformed envelope) but the
//!   fallback chain moves on to the next candidate. Stored inside
//!   [`crate::output::ModelAttempt`] so callers can inspect which candidates
//!   were tried and why they lost.
//!
//! The separation lets callers decide their own tolerance: a losing candidate
//! is routine, an exhausted candidate list is a user-facing failure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2report library.
///
/// Per-candidate failures use [`ModelError`] and are stored in
/// [`crate::output::AnalysisStats`] rather than propagated here.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    // ── Input validation ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The document is not a PDF (magic bytes are not `%PDF`).
    #[error("'{name}' is not a valid PDF file\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    /// The document exceeds the accepted size limit.
    #[error("'{name}' is {size} bytes, over the {limit}-byte limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// No API key was supplied.
    #[error("A Gemini API key is required.\nGet one from https://ai.google.dev/ and pass it with --api-key or GEMINI_API_KEY.")]
    MissingApiKey,

    /// No document has been selected for analysis.
    #[error("No document selected")]
    MissingDocument,

    /// An analysis is already running on this session.
    #[error("An analysis is already in progress")]
    AnalysisInProgress,

    // ── Extraction ───────────────────────────────────────────────────────
    /// The PDF library could not load the document or one of its pages.
    #[error("Failed to extract text from the PDF: {detail}")]
    ExtractionFailed { detail: String },

    /// Extraction succeeded but produced no text at all.
    ///
    /// Recoverable, user-facing: the document is likely scanned or
    /// image-only. Raised before any network request is made.
    #[error("No text could be extracted from the PDF.\nThe file may be scanned or contain only images.")]
    EmptyExtraction,

    // ── Model fallback ───────────────────────────────────────────────────
    /// Every candidate model in the fallback chain failed.
    #[error("All {attempts} candidate models failed.\nLast error: {last_error}")]
    AllModelsFailed { attempts: usize, last_error: String },

    // ── Report export ────────────────────────────────────────────────────
    /// There is no analysis result to export.
    #[error("No analysis result available to export")]
    NoAnalysisResult,

    /// Report generation failed.
    #[error("Failed to generate the PDF report: {detail}")]
    ExportFailed { detail: String },

    /// Could not create or write the output report file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single candidate model.
///
/// Recorded in [`crate::output::ModelAttempt`] when a candidate fails.
/// The fallback chain continues unless ALL candidates fail.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ModelError {
    /// The HTTP request to the proxy endpoint could not be completed.
    #[error("{model}: request failed: {detail}")]
    Transport { model: String, detail: String },

    /// The proxy answered with a non-success status.
    #[error("{model}: HTTP {status}: {message}")]
    Status {
        model: String,
        status: u16,
        message: String,
    },

    /// The response parsed but did not contain a usable text part.
    #[error("{model}: unexpected response format from Gemini API")]
    MalformedEnvelope { model: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_models_failed_display() {
        let e = AnalyzeError::AllModelsFailed {
            attempts: 2,
            last_error: "HTTP 401: Invalid API key".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("2 candidate models"), "got: {msg}");
        assert!(msg.contains("Invalid API key"));
    }

    #[test]
    fn empty_extraction_mentions_scanned() {
        let msg = AnalyzeError::EmptyExtraction.to_string();
        assert!(msg.contains("scanned"));
    }

    #[test]
    fn file_too_large_display() {
        let e = AnalyzeError::FileTooLarge {
            name: "big.pdf".into(),
            size: 150_000_000,
            limit: 104_857_600,
        };
        assert!(e.to_string().contains("big.pdf"));
        assert!(e.to_string().contains("104857600"));
    }

    #[test]
    fn model_error_status_display() {
        let e = ModelError::Status {
            model: "gemini-2.0-flash".into(),
            status: 429,
            message: "API quota exceeded".into(),
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("gemini-2.0-flash"));
    }
}
