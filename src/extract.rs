//! PDF text extraction.
//!
//! Takes the raw bytes of an uploaded PDF and returns the concatenated text
//! of all pages in document order. Pages without extractable text (for
//! example image-only scans) contribute nothing; a document whose pages
//! yield no text at all is rejected so an empty knowledge index is never
//! built from it.

/// Extraction error. Extraction failure aborts the upload pipeline; no
/// partial result is retained.
#[derive(Debug)]
pub enum ExtractError {
    /// The PDF could not be parsed or decoded; carries full diagnostic detail.
    Pdf(String),
    /// The PDF parsed but produced no text on any page.
    EmptyDocument,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::EmptyDocument => {
                write!(f, "PDF contains no extractable text")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract the full text of a PDF from its raw bytes.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(text)
}
