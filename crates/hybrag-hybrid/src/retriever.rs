use anyhow::Result;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use hybrag_core::chunker::Chunker;
use hybrag_core::config::{RetrievalSettings, Settings};
use hybrag_core::data_processor::DataProcessor;
use hybrag_core::error::Error;
use hybrag_core::traits::{RelevanceScorer, VectorIndexer};
use hybrag_core::types::{Chunk, RerankedHit, RetrievalHit};
use hybrag_embed::{get_default_embedder, get_default_scorer};
use hybrag_text::LexicalIndex;
use hybrag_vector::LanceVectorIndex;
use hybrag_web::WebSource;

use crate::fusion::{assemble_context, dedup_by_text, rerank};

/// Per-request caps for each source and for the reranker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    pub top_k_vec: usize,
    pub top_k_bm25: usize,
    pub top_k_web: usize,
    pub top_k_rerank: usize,
    pub distance_threshold: f32,
    pub dedup_by_text: bool,
}

impl Default for RetrievalParams {
    fn default() -> Self { Self::from(&RetrievalSettings::default()) }
}

impl From<&RetrievalSettings> for RetrievalParams {
    fn from(s: &RetrievalSettings) -> Self {
        Self {
            top_k_vec: s.top_k_vec,
            top_k_bm25: s.top_k_bm25,
            top_k_web: s.top_k_web,
            top_k_rerank: s.top_k_rerank,
            distance_threshold: s.distance_threshold,
            dedup_by_text: s.dedup_by_text,
        }
    }
}

/// Corpus state of one ingestion epoch. Replaced wholesale, never mutated.
pub struct CorpusSnapshot {
    pub epoch: u64,
    pub chunks: usize,
    pub lexical: LexicalIndex,
}

impl CorpusSnapshot {
    fn empty() -> Self { Self { epoch: 0, chunks: 0, lexical: LexicalIndex::empty() } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub epoch: u64,
    pub chunks: usize,
    pub vector_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutput {
    pub context: String,
    pub hits: Vec<RerankedHit>,
    pub epoch: u64,
}

/// Hybrid retrieval over a vector index, an in-memory lexical index and the web.
///
/// Queries hold the snapshot read guard for their whole duration; ingestion
/// holds the write guard while both corpus indices are rebuilt.
pub struct HybridRetriever<VI: VectorIndexer> {
    vector: VI,
    web: WebSource,
    scorer: Box<dyn RelevanceScorer>,
    processor: DataProcessor,
    snapshot: RwLock<CorpusSnapshot>,
}

impl HybridRetriever<LanceVectorIndex> {
    /// Local models, the LanceDB store and the web source as configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = get_default_embedder(&settings.models)?;
        let vector = LanceVectorIndex::from_settings(settings, embedder)?;
        let scorer = get_default_scorer(&settings.models)?;
        let web = WebSource::from_settings(&settings.web);
        let processor = DataProcessor::with_chunker(Chunker::from_settings(&settings.chunking)?);
        Ok(Self::new(vector, web, scorer).with_processor(processor))
    }
}

impl<VI: VectorIndexer> HybridRetriever<VI> {
    pub fn new(vector: VI, web: WebSource, scorer: Box<dyn RelevanceScorer>) -> Self {
        Self { vector, web, scorer, processor: DataProcessor::new(), snapshot: RwLock::new(CorpusSnapshot::empty()) }
    }

    pub fn with_processor(mut self, processor: DataProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn vector_index(&self) -> &VI { &self.vector }

    /// Epoch of the current snapshot; zero before the first ingestion.
    pub fn epoch(&self) -> Result<u64> { Ok(self.read_snapshot()?.epoch) }

    pub fn chunk_count(&self) -> Result<usize> { Ok(self.read_snapshot()?.chunks) }

    pub fn ingest(&self, data_dir: &Path) -> Result<IngestReport> {
        let chunks = self.processor.process_directory(data_dir)?;
        self.ingest_chunks(chunks)
    }

    /// Rebuild both corpus indices from `chunks` and publish a new epoch.
    ///
    /// The lexical index is built first. On failure the previous snapshot
    /// stays published, but rows already written to the vector store are not
    /// rolled back.
    pub fn ingest_chunks(&self, chunks: Vec<Chunk>) -> Result<IngestReport> {
        let mut guard = self.write_snapshot()?;
        let lexical = LexicalIndex::build(&chunks)?;
        let vector_rows = self.vector.rebuild(&chunks)?;
        let epoch = guard.epoch + 1;
        *guard = CorpusSnapshot { epoch, chunks: chunks.len(), lexical };
        info!(epoch, chunks = chunks.len(), vector_rows, "ingestion complete");
        Ok(IngestReport { epoch, chunks: chunks.len(), vector_rows })
    }

    /// Candidates from every source, concatenated as vector, lexical, web.
    pub fn gather(&self, query: &str, params: &RetrievalParams) -> Result<Vec<RetrievalHit>> {
        let snapshot = self.read_snapshot()?;
        self.gather_with(&snapshot, query, params)
    }

    pub fn hybrid_retrieve(&self, query: &str, params: &RetrievalParams) -> Result<RetrievalOutput> {
        let snapshot = self.read_snapshot()?;
        let candidates = self.gather_with(&snapshot, query, params)?;
        let hits = rerank(self.scorer.as_ref(), query, candidates, params.top_k_rerank)?;
        let context = assemble_context(&hits);
        Ok(RetrievalOutput { context, hits, epoch: snapshot.epoch })
    }

    fn gather_with(&self, snapshot: &CorpusSnapshot, query: &str, params: &RetrievalParams) -> Result<Vec<RetrievalHit>> {
        // corpus sources only answer for an ingested epoch
        let (vector_hits, lexical_hits) = if snapshot.epoch == 0 {
            (vec![], vec![])
        } else {
            (
                self.vector.query(query, params.top_k_vec, params.distance_threshold)?,
                snapshot.lexical.query(query, params.top_k_bm25)?,
            )
        };
        let web_hits = self.web.query(query, params.top_k_web);
        debug!(vector = vector_hits.len(), lexical = lexical_hits.len(), web = web_hits.len(), epoch = snapshot.epoch, "gathered candidates");

        let mut candidates = Vec::with_capacity(vector_hits.len() + lexical_hits.len() + web_hits.len());
        candidates.extend(vector_hits);
        candidates.extend(lexical_hits);
        candidates.extend(web_hits);
        Ok(if params.dedup_by_text { dedup_by_text(candidates) } else { candidates })
    }

    fn read_snapshot(&self) -> Result<RwLockReadGuard<'_, CorpusSnapshot>> {
        self.snapshot.read().map_err(|_| Error::Operation("corpus snapshot lock poisoned".to_string()).into())
    }

    fn write_snapshot(&self) -> Result<RwLockWriteGuard<'_, CorpusSnapshot>> {
        self.snapshot.write().map_err(|_| Error::Operation("corpus snapshot lock poisoned".to_string()).into())
    }
}
