// src/extract/pdf.rs

use super::ExtractError;

/// Page texts of a PDF held in memory, each page ending with `\n`.
#[cfg(feature = "pdf")]
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(pages.iter().map(|page| format!("{page}\n")).collect())
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf(_bytes: &[u8]) -> Result<String, ExtractError> {
    Ok(super::PDF_PLACEHOLDER.to_string())
}
