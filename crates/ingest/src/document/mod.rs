mod pdf;
mod text;

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract page-level text from a source file, dispatching on extension.
///
/// PDF pages map 1:1 onto physical pages (empty pages are preserved so
/// page numbers stay aligned with the file). Plain-text sources are
/// pseudo-paged at roughly `page_char_limit` characters to keep downstream
/// chunking inputs bounded regardless of file size.
pub fn extract_pages(path: &Path, page_char_limit: usize) -> Result<Vec<String>, ExtractionError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "pdf" => pdf::extract_pdf_pages(path),
        "txt" | "text" | "md" | "markdown" => text::extract_text_pages(path, page_char_limit),
        other => Err(ExtractionError::UnsupportedType(other.to_string())),
    }
}
