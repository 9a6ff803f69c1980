use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use futures_util::StreamExt;
use regex::Regex;

use super::document::Document;
use super::pdf;
use super::IndexError;
use crate::core::errors::ApiError;

/// Cap on a fetched page body so one runaway response cannot exhaust memory.
const MAX_FETCH_BYTES: usize = 2_000_000;

/// Loads up to `max_files` PDFs from the documents directory, one `Document`
/// per readable page. A missing directory or an empty one is fatal; a PDF
/// that fails to parse is logged and skipped.
pub async fn load_pdf_documents(
    dir: &Path,
    max_files: usize,
) -> Result<Vec<Document>, IndexError> {
    if !dir.is_dir() {
        return Err(IndexError::SourceNotFound(format!(
            "data directory not found at {}",
            dir.display()
        )));
    }

    let mut pdf_paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| IndexError::Api(ApiError::internal(e)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_pdf(path))
        .collect();

    if pdf_paths.is_empty() {
        return Err(IndexError::SourceNotFound(format!(
            "no PDF files found in {}",
            dir.display()
        )));
    }

    // Name order keeps which files feed the index deterministic.
    pdf_paths.sort();
    pdf_paths.truncate(max_files.max(1));

    let mut documents = Vec::new();
    for path in pdf_paths {
        let name = file_name(&path);
        let task_path = path.clone();
        let extracted = tokio::task::spawn_blocking(move || pdf::extract_page_texts(&task_path))
            .await
            .map_err(|e| IndexError::Api(ApiError::internal(e)))?;

        match extracted {
            Ok(pages) => {
                for page in pages {
                    documents.push(Document::new(page.text, name.clone()).with_page(page.number));
                }
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
            }
        }
    }

    if documents.is_empty() {
        return Err(IndexError::NoDocumentsLoaded);
    }

    tracing::info!("loaded {} page documents from PDF files", documents.len());
    Ok(documents)
}

/// Fetches each URL into one `Document` of tag-stripped text. Failed or
/// empty pages are logged and skipped.
pub async fn load_url_documents(
    client: &reqwest::Client,
    urls: &[String],
) -> Result<Vec<Document>, IndexError> {
    if urls.is_empty() {
        return Err(IndexError::SourceNotFound(
            "no index URLs configured".to_string(),
        ));
    }

    let mut documents = Vec::new();
    for url in urls {
        match fetch_page_text(client, url).await {
            Ok(text) if !text.trim().is_empty() => {
                documents.push(Document::new(text, url.clone()));
            }
            Ok(_) => tracing::warn!("skipping {}: page produced no text", url),
            Err(e) => tracing::warn!("skipping {}: {}", url, e),
        }
    }

    if documents.is_empty() {
        return Err(IndexError::NoDocumentsLoaded);
    }

    tracing::info!("loaded {} documents from URLs", documents.len());
    Ok(documents)
}

async fn fetch_page_text(client: &reqwest::Client, url: &str) -> Result<String, ApiError> {
    let res = client.get(url).send().await.map_err(ApiError::upstream)?;
    if !res.status().is_success() {
        return Err(ApiError::ServiceUnavailable(format!(
            "{} returned {}",
            url,
            res.status()
        )));
    }

    let mut body: Vec<u8> = Vec::new();
    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::upstream)?;
        let remaining = MAX_FETCH_BYTES.saturating_sub(body.len());
        if remaining == 0 {
            tracing::warn!("truncating {} at {} bytes", url, MAX_FETCH_BYTES);
            break;
        }
        body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
    }

    Ok(strip_html_tags(&String::from_utf8_lossy(&body)))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(script|style)\b.*?</(script|style)\s*>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

/// Reduces an HTML page to its visible text: script/style blocks removed,
/// tags dropped, common entities decoded, blank lines collapsed.
fn strip_html_tags(html: &str) -> String {
    let without_blocks = script_style_re().replace_all(html, " ");
    let without_tags = tag_re().replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);

    decoded
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_keeps_visible_text_only() {
        let html = r#"
            <html>
            <head><script>var x = 1;</script><style>p { color: red }</style></head>
            <body>
                <h1>Hello</h1>
                <p>World &amp; friends</p>
            </body>
            </html>
        "#;

        let text = strip_html_tags(html);
        assert!(text.contains("Hello"));
        assert!(text.contains("World & friends"));
        assert!(!text.contains('<'));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn pdf_extension_check_is_case_insensitive() {
        assert!(is_pdf(Path::new("a.pdf")));
        assert!(is_pdf(Path::new("b.PDF")));
        assert!(!is_pdf(Path::new("c.txt")));
        assert!(!is_pdf(Path::new("noext")));
    }

    #[tokio::test]
    async fn missing_directory_is_source_not_found() {
        let err = load_pdf_documents(Path::new("/nonexistent/corrag-data"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::SourceNotFound(_)));
        assert!(err.to_string().contains("data directory not found"));
    }

    #[tokio::test]
    async fn directory_without_pdfs_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a pdf").unwrap();

        let err = load_pdf_documents(dir.path(), 2).await.unwrap_err();
        assert!(matches!(err, IndexError::SourceNotFound(_)));
        assert!(err.to_string().contains("no PDF files found"));
    }

    #[tokio::test]
    async fn unreadable_pdfs_are_skipped_then_fatal_when_none_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"not really a pdf").unwrap();

        let err = load_pdf_documents(dir.path(), 2).await.unwrap_err();
        assert!(matches!(err, IndexError::NoDocumentsLoaded));
    }

    #[tokio::test]
    async fn empty_url_list_is_source_not_found() {
        let client = reqwest::Client::new();
        let err = load_url_documents(&client, &[]).await.unwrap_err();
        assert!(matches!(err, IndexError::SourceNotFound(_)));
    }
}
