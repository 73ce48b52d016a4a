//! Output types returned by the analysis pipeline.

use crate::config::AnalysisType;
use crate::error::ModelError;
use serde::Serialize;

/// The result of a successful document analysis.
///
/// Retained in memory only: it feeds both the on-screen formatter
/// ([`crate::pipeline::format`]) and the report exporter
/// ([`crate::pipeline::report`]), and is never persisted by the library.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// The raw analysis text returned by the winning model.
    pub analysis: String,

    /// Identifier of the candidate model that produced the answer.
    pub model: String,

    /// The analysis type that was run.
    pub analysis_type: AnalysisType,

    /// Name of the source document (used in the report metadata block and
    /// the exported filename).
    pub source_name: String,

    /// Run statistics.
    pub stats: AnalysisStats,
}

/// Statistics for an analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    /// Pages in the source document.
    pub page_count: usize,

    /// Characters extracted from the document (before truncation).
    pub extracted_chars: usize,

    /// Whether the document text was cut at the prompt character cap.
    pub truncated: bool,

    /// Every candidate model tried, in order. The last entry with
    /// `error: None` is the winner.
    pub attempts: Vec<ModelAttempt>,

    /// Wall-clock time spent extracting text.
    pub extract_duration_ms: u64,

    /// Wall-clock time spent in the model fallback chain.
    pub llm_duration_ms: u64,

    /// Total wall-clock time for the run.
    pub total_duration_ms: u64,
}

/// One entry in the model fallback chain.
#[derive(Debug, Clone, Serialize)]
pub struct ModelAttempt {
    /// The candidate model identifier.
    pub model: String,

    /// `None` when this candidate produced the answer; otherwise why it lost.
    pub error: Option<ModelError>,
}

/// Document facts available without an API key.
///
/// Returned by [`crate::analyze::inspect`].
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    /// Number of pages.
    pub page_count: usize,

    /// PDF version string from the header (e.g. "1.7").
    pub pdf_version: String,

    /// Whether the document carries an encryption dictionary.
    pub encrypted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialises_to_json() {
        let out = AnalysisOutput {
            analysis: "RESUMEN EJECUTIVO\ntexto".into(),
            model: "gemini-2.0-flash".into(),
            analysis_type: AnalysisType::Summary,
            source_name: "informe.pdf".into(),
            stats: AnalysisStats {
                page_count: 2,
                extracted_chars: 840,
                truncated: false,
                attempts: vec![ModelAttempt {
                    model: "gemini-2.0-flash".into(),
                    error: None,
                }],
                extract_duration_ms: 12,
                llm_duration_ms: 950,
                total_duration_ms: 970,
            },
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["analysis_type"], "summary");
        assert_eq!(json["stats"]["attempts"][0]["model"], "gemini-2.0-flash");
        assert!(json["stats"]["attempts"][0]["error"].is_null());
    }
}
