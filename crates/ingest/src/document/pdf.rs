use std::path::Path;

use super::ExtractionError;

pub fn extract_pdf_pages(path: &Path) -> Result<Vec<String>, ExtractionError> {
    let text = pdf_extract::extract_text(path).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    // pdf-extract returns all text as one string with form feed characters
    // (\x0C) separating pages. Empty pages are kept so page numbers stay
    // 1-based and aligned with the physical file.
    let mut pages: Vec<String> = text
        .split('\x0C')
        .map(|page| page.trim().to_string())
        .collect();

    // A trailing form feed yields a phantom empty page; drop it.
    if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
        pages.pop();
    }

    if pages.is_empty() {
        tracing::warn!("PDF produced no text (scanned or image-only?): {}", path.display());
        pages.push(String::new());
    }

    Ok(pages)
}
