use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::chunker::Chunker;
use crate::extract::{default_extractors, join_pages};
use crate::traits::TextExtractor;
use crate::types::{Chunk, ChunkId, ChunkMeta};

/// Walks a document directory, extracts text and cuts it into chunks.
///
/// Chunk ids are positional across the whole run, starting at zero.
pub struct DataProcessor {
    chunker: Chunker,
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl Default for DataProcessor {
    fn default() -> Self {
        Self { chunker: Chunker::default(), extractors: default_extractors() }
    }
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_chunker(chunker: Chunker) -> Self {
        Self { chunker, extractors: default_extractors() }
    }

    pub fn with_extractors(mut self, extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let files = self.list_documents(data_dir);
        self.process_files(data_dir, &files)
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Chunk>> {
        let mut files = self.list_documents(data_dir);
        if files.len() > limit { files.truncate(limit); info!(limit, "limited ingestion to first documents"); }
        self.process_files(data_dir, &files)
    }

    /// Chunk already-extracted documents, given as `(filename, text)` pairs.
    pub fn chunk_documents<'a, I>(&self, documents: I) -> Vec<Chunk>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut chunks = Vec::new();
        for (filename, text) in documents {
            self.push_chunks(&mut chunks, filename, text);
        }
        chunks
    }

    fn process_files(&self, data_dir: &Path, files: &[PathBuf]) -> Result<Vec<Chunk>> {
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no ingestible documents found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        let mut skipped = 0usize;
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), "processing document {}/{}", file_index + 1, files.len());
            let Some(text) = self.read_document(file_path) else { skipped += 1; continue; };
            if text.trim().is_empty() { skipped += 1; continue; }
            let filename = self.filename_for(file_path, data_dir);
            self.push_chunks(&mut all_chunks, &filename, &text);
        }
        info!(documents = files.len(), skipped, chunks = all_chunks.len(), "processed corpus");
        Ok(all_chunks)
    }

    fn push_chunks(&self, chunks: &mut Vec<Chunk>, filename: &str, text: &str) {
        for window in self.chunker.split(text) {
            chunks.push(Chunk {
                id: ChunkId(chunks.len()),
                offset: window.offset,
                text: window.text,
                meta: ChunkMeta::corpus(filename),
            });
        }
    }

    fn read_document(&self, file_path: &Path) -> Option<String> {
        let extractor = self.extractor_for(file_path)?;
        match extractor.extract_pages(file_path) {
            Ok(pages) => Some(join_pages(&pages)),
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "could not open document, skipping");
                None
            }
        }
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn TextExtractor> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extractors.iter().find(|x| x.extensions().iter().any(|e| *e == ext)).map(|b| b.as_ref())
    }

    fn filename_for(&self, file_path: &Path, data_dir: &Path) -> String {
        file_path.strip_prefix(data_dir).unwrap_or(file_path).to_string_lossy().to_string()
    }

    fn list_documents(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if self.extractor_for(path).is_some() { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}
