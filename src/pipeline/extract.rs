//! Text extraction: turn a PDF byte buffer into one concatenated string.
//!
//! Pages are walked in document order; the text runs of each page are joined
//! with single spaces and pages are joined with a blank line. An empty or
//! whitespace-only result is *not* an error here — the caller treats it as a
//! recoverable "scanned or image-only document" condition and must raise it
//! before any network request is made.

use crate::error::AnalyzeError;
use crate::output::DocumentInfo;
use lopdf::Document as PdfDocument;
use tracing::debug;

/// Separator between consecutive pages in the concatenated output.
const PAGE_SEPARATOR: &str = "\n\n";

/// The extraction result: concatenated text plus the page count.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Per-page text, pages separated by a blank line.
    pub text: String,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// Extract the full text of a PDF held in memory.
///
/// # Errors
/// [`AnalyzeError::ExtractionFailed`] when the document or one of its pages
/// cannot be parsed. An extractable-but-empty document returns `Ok` with an
/// empty `text`.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, AnalyzeError> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| AnalyzeError::ExtractionFailed {
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    let page_count = pages.len();
    let mut numbers: Vec<u32> = pages.keys().copied().collect();
    numbers.sort_unstable();

    let mut page_texts = Vec::with_capacity(page_count);
    for n in numbers {
        let raw = doc
            .extract_text(&[n])
            .map_err(|e| AnalyzeError::ExtractionFailed {
                detail: format!("page {n}: {e}"),
            })?;
        page_texts.push(join_runs(&raw));
    }

    let text = page_texts.join(PAGE_SEPARATOR);
    debug!(
        "Extracted {} chars from {} pages",
        text.len(),
        page_count
    );

    Ok(ExtractedText { text, page_count })
}

/// Join a page's text runs with single spaces.
///
/// `lopdf` separates runs with newlines and may carry layout whitespace;
/// collapsing all of it to single spaces mirrors reading order without
/// preserving visual layout.
fn join_runs(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, run) in raw.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(run);
    }
    out
}

/// Read document facts without extracting text (and without an API key).
pub fn inspect_document(bytes: &[u8]) -> Result<DocumentInfo, AnalyzeError> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| AnalyzeError::ExtractionFailed {
        detail: e.to_string(),
    })?;

    Ok(DocumentInfo {
        page_count: doc.get_pages().len(),
        pdf_version: doc.version.clone(),
        encrypted: doc.trailer.get(b"Encrypt").is_ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_runs_collapses_whitespace() {
        assert_eq!(join_runs("Hola\nmundo  cruel\n"), "Hola mundo cruel");
        assert_eq!(join_runs(""), "");
        assert_eq!(join_runs("   \n  "), "");
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = extract_text(b"%PDF-1.7 but not really a pdf");
        assert!(matches!(err, Err(AnalyzeError::ExtractionFailed { .. })));
    }
}
