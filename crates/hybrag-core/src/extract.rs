//! Document → text extractors used during ingestion.

use std::fs;
use std::path::Path;

use pdf_extract::extract_text_from_mem;

use crate::error::Error;
use crate::traits::TextExtractor;

/// PDF text via `pdf-extract`; pages are split on form feeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let bytes = fs::read(path)?;
        // pdf-extract panics on some malformed inputs
        let raw = std::panic::catch_unwind(|| extract_text_from_mem(&bytes))
            .map_err(|_| Error::Extraction { path: path.to_path_buf(), reason: "extractor panicked".to_string() })?
            .map_err(|e| Error::Extraction { path: path.to_path_buf(), reason: e.to_string() })?;
        Ok(split_pages(&raw))
    }
}

/// Plain UTF-8 text, lossily decoded when the file is not valid UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }

    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(&fs::read(path)?).to_string(),
        };
        Ok(split_pages(&content))
    }
}

/// Split on form feed and drop pages that carry no text.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split('\x0C')
        .filter(|page| !page.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Join pages the way ingestion expects: each page followed by a newline.
pub fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages.iter().filter(|p| !p.trim().is_empty()) {
        text.push_str(page);
        text.push('\n');
    }
    text
}

pub fn default_extractors() -> Vec<Box<dyn TextExtractor>> {
    vec![Box::new(PdfExtractor), Box::new(PlainTextExtractor)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_pages_are_skipped() {
        let pages = split_pages("first page\x0C   \n\x0Cthird page");
        assert_eq!(pages, vec!["first page".to_string(), "third page".to_string()]);
        assert_eq!(join_pages(&pages), "first page\nthird page\n");
    }

    #[test]
    fn garbage_pdf_is_an_extraction_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        fs::write(&path, b"definitely not a pdf").unwrap();
        let err = PdfExtractor.extract_pages(&path).unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some());
    }
}
