use std::path::Path;

use lopdf::Document as PdfDocument;

use crate::core::errors::ApiError;

#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Extracts text page by page. Pages whose extraction yields only whitespace
/// (scanned images, vector-only pages) are dropped; a PDF where every page is
/// unreadable is an error.
pub fn extract_page_texts(path: &Path) -> Result<Vec<PageText>, ApiError> {
    let document = PdfDocument::load(path)
        .map_err(|e| ApiError::BadRequest(format!("failed to parse {}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for (page_no, _page_id) in document.get_pages() {
        let text = document.extract_text(&[page_no]).map_err(|e| {
            ApiError::BadRequest(format!(
                "failed to extract page {} of {}: {}",
                page_no,
                path.display(),
                e
            ))
        })?;

        if !text.trim().is_empty() {
            pages.push(PageText {
                number: page_no,
                text,
            });
        }
    }

    if pages.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "pdf had no readable page text: {}",
            path.display()
        )));
    }

    Ok(pages)
}

/// Whole-document text for the upload page's Read action, pages joined with
/// a newline.
pub fn extract_text(path: &Path) -> Result<String, ApiError> {
    let pages = extract_page_texts(path)?;
    Ok(pages
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("\n"))
}
