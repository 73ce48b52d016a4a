//! Input validation: turn user-supplied bytes or a path into a [`Document`].
//!
//! Validation happens at acceptance time so every later stage can assume a
//! plausible PDF: the magic bytes must read `%PDF` and the size must stay
//! under [`MAX_DOCUMENT_BYTES`]. A rejected file never reaches the parser,
//! which keeps extraction errors meaningful ("the PDF is broken") instead of
//! noisy ("you gave me a JPEG").

use crate::error::AnalyzeError;
use std::path::Path;
use tracing::debug;

/// Maximum accepted document size: 100 MB.
pub const MAX_DOCUMENT_BYTES: u64 = 100 * 1024 * 1024;

/// A validated PDF document held in memory.
///
/// Immutable once accepted; re-selection replaces it wholesale. The byte
/// buffer lives only as long as the analysis needs it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original filename, kept for the report metadata and export filename.
    pub name: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Validate and accept raw bytes as a PDF document.
    ///
    /// Checks, in order: the `%PDF` magic (a wrong file type is the most
    /// common user mistake) and the size cap.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AnalyzeError> {
        let name = name.into();

        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        if &magic != b"%PDF" {
            return Err(AnalyzeError::NotAPdf { name, magic });
        }

        let size = bytes.len() as u64;
        if size > MAX_DOCUMENT_BYTES {
            return Err(AnalyzeError::FileTooLarge {
                name,
                size,
                limit: MAX_DOCUMENT_BYTES,
            });
        }

        debug!("Accepted document '{}' ({} bytes)", name, size);
        Ok(Self { name, bytes })
    }

    /// The filename without its `.pdf` extension, for report filenames.
    pub fn stem(&self) -> &str {
        self.name
            .strip_suffix(".pdf")
            .or_else(|| self.name.strip_suffix(".PDF"))
            .unwrap_or(&self.name)
    }
}

/// Load and validate a document from a filesystem path.
pub fn load_document(path: &Path) -> Result<Document, AnalyzeError> {
    if !path.exists() {
        return Err(AnalyzeError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(AnalyzeError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(AnalyzeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    Document::from_bytes(name, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_magic() {
        let doc = Document::from_bytes("ok.pdf", b"%PDF-1.7\n...".to_vec()).unwrap();
        assert_eq!(doc.name, "ok.pdf");
    }

    #[test]
    fn rejects_wrong_magic() {
        let err = Document::from_bytes("photo.pdf", b"\x89PNG\r\n".to_vec());
        assert!(matches!(err, Err(AnalyzeError::NotAPdf { .. })));
    }

    #[test]
    fn rejects_empty_and_tiny_buffers() {
        assert!(matches!(
            Document::from_bytes("empty.pdf", vec![]),
            Err(AnalyzeError::NotAPdf { .. })
        ));
        assert!(matches!(
            Document::from_bytes("tiny.pdf", b"%P".to_vec()),
            Err(AnalyzeError::NotAPdf { .. })
        ));
    }

    #[test]
    fn rejects_oversized_documents() {
        let mut bytes = vec![0u8; (MAX_DOCUMENT_BYTES + 1) as usize];
        bytes[..4].copy_from_slice(b"%PDF");
        let err = Document::from_bytes("big.pdf", bytes);
        assert!(matches!(err, Err(AnalyzeError::FileTooLarge { .. })));
    }

    #[test]
    fn stem_drops_the_extension() {
        let doc = Document::from_bytes("informe anual.pdf", b"%PDF-1.4".to_vec()).unwrap();
        assert_eq!(doc.stem(), "informe anual");
        let doc = Document::from_bytes("SHOUTY.PDF", b"%PDF-1.4".to_vec()).unwrap();
        assert_eq!(doc.stem(), "SHOUTY");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_document(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(err, Err(AnalyzeError::FileNotFound { .. })));
    }
}
