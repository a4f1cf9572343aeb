//! Text extraction from downloaded documents.

use std::path::Path;
use crate::{Error, Result};

/// Reads text out of a stored document.
pub trait DocumentReader: Send + Sync {
    /// Text of the first page only
    fn first_page_text(&self, path: &Path) -> Result<String>;

    /// Text of the whole document
    fn full_text(&self, path: &Path) -> Result<String>;
}

/// PDF reader: `lopdf` for single-page reads, `pdf-extract` for the full text.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    fn check_file(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(Error::Pdf(format!("File not found: {}", path.display())));
        }
        Ok(())
    }
}

impl DocumentReader for PdfReader {
    fn first_page_text(&self, path: &Path) -> Result<String> {
        Self::check_file(path)?;
        let document = lopdf::Document::load(path)
            .map_err(|e| Error::Pdf(format!("Failed to load {}: {}", path.display(), e)))?;
        document
            .extract_text(&[1])
            .map_err(|e| Error::Pdf(format!("Failed to read first page of {}: {}", path.display(), e)))
    }

    fn full_text(&self, path: &Path) -> Result<String> {
        Self::check_file(path)?;
        let text = pdf_extract::extract_text(path)
            .map_err(|e| Error::Pdf(format!("Failed to extract text from {}: {}", path.display(), e)))?;
        if text.trim().is_empty() {
            tracing::debug!("Extracted empty text from PDF: {}", path.display());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let reader = PdfReader::new();
        assert!(matches!(
            reader.first_page_text(Path::new("/nonexistent/file.pdf")),
            Err(Error::Pdf(_))
        ));
        assert!(matches!(
            reader.full_text(Path::new("/nonexistent/file.pdf")),
            Err(Error::Pdf(_))
        ));
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        assert!(PdfReader::new().first_page_text(&path).is_err());
    }
}
