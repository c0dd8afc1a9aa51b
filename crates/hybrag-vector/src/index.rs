//! Persistent dense index over corpus chunks.
//!
//! LanceDB is async; `LanceVectorIndex` owns a Tokio runtime and exposes
//! blocking methods so the retrieval pipeline stays synchronous. Every store
//! call runs under the configured timeout.
use anyhow::{anyhow, Result};
use arrow_schema::{ArrowError, Schema};
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use hybrag_core::config::{expand_path, Settings};
use hybrag_core::error::Error;
use hybrag_core::traits::{Embedder, VectorIndexer};
use hybrag_core::types::{Chunk, ChunkMeta, RetrievalHit, SourceScore};

use crate::schema::{build_arrow_schema, CHUNK_INDEX_COLUMN, CONTENT_COLUMN, DISTANCE_COLUMN, FILENAME_COLUMN};
use crate::table::{ensure_chunk_table, open_db, open_existing};

pub const DEFAULT_BATCH_SIZE: usize = 64;

pub struct LanceVectorIndex {
	runtime: Runtime,
	db: Connection,
	table_name: String,
	embedder: Box<dyn Embedder>,
	timeout: Duration,
	batch_size: usize,
}

impl LanceVectorIndex {
	pub fn open(db_path: &Path, table_name: &str, embedder: Box<dyn Embedder>, timeout: Duration) -> Result<Self> {
		let runtime = Runtime::new()?;
		let uri = db_path.to_string_lossy().to_string();
		let db = block_with_timeout(&runtime, timeout, "open vector store", open_db(&uri))?;
		info!(path = %uri, table = table_name, dim = embedder.dim(), "opened vector store");
		Ok(Self { runtime, db, table_name: table_name.to_string(), embedder, timeout, batch_size: DEFAULT_BATCH_SIZE })
	}

	/// Open the store named by `data.vector_db_dir` / `data.collection`.
	pub fn from_settings(settings: &Settings, embedder: Box<dyn Embedder>) -> Result<Self> {
		let db_path = expand_path(&settings.data.vector_db_dir);
		if let Some(parent) = db_path.parent() { std::fs::create_dir_all(parent)?; }
		let index = Self::open(&db_path, &settings.data.collection, embedder, Duration::from_secs(settings.store.timeout_secs))?;
		Ok(index.with_batch_size(settings.models.batch_size))
	}

	pub fn with_batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size.max(1);
		self
	}

	pub fn table_name(&self) -> &str { &self.table_name }

	/// Rows currently persisted; zero when the table does not exist yet.
	pub fn len(&self) -> Result<usize> {
		self.block("count rows", count_rows(&self.db, &self.table_name))
	}

	pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }

	pub fn rebuild(&self, chunks: &[Chunk]) -> Result<usize> {
		let embeddings = self.embed_chunks(chunks)?;
		let dim = self.embedder.dim();
		let schema = build_arrow_schema(i32::try_from(dim)?);
		let mut batches: Vec<Result<RecordBatch, ArrowError>> = Vec::new();
		for (chunk_batch, vec_batch) in chunks.chunks(self.batch_size).zip(embeddings.chunks(self.batch_size)) {
			batches.push(Ok(chunks_to_record_batch(&schema, chunk_batch, vec_batch, dim)?));
		}

		self.block("rebuild vector table", replace_rows(&self.db, &self.table_name, dim, schema, batches))?;
		info!(rows = chunks.len(), table = %self.table_name, "vector index rebuilt");
		Ok(chunks.len())
	}

	/// Nearest `k` chunks with `distance < distance_threshold`. When nothing
	/// passes but the index has rows, the single nearest row is returned.
	pub fn query(&self, text: &str, k: usize, distance_threshold: f32) -> Result<Vec<RetrievalHit>> {
		if k == 0 { return Ok(vec![]); }
		let query_vec = self.embedder.embed_batch(&[text.to_string()])?.into_iter().next()
			.ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
		if query_vec.len() != self.embedder.dim() {
			return Err(Error::DimensionMismatch { expected: self.embedder.dim(), actual: query_vec.len() }.into());
		}

		let mut nearest = self.block("vector search", nearest_rows(&self.db, &self.table_name, query_vec, k))?;

		nearest.sort_by(|a, b| distance_of(a).total_cmp(&distance_of(b)));
		nearest.truncate(k);
		let total = nearest.len();
		let mut hits: Vec<RetrievalHit> = nearest.iter().filter(|h| distance_of(h) < distance_threshold).cloned().collect();
		if hits.is_empty() {
			if let Some(first) = nearest.into_iter().next() {
				debug!(threshold = distance_threshold, "no vector hit under threshold, keeping nearest");
				hits.push(first);
			}
		}
		debug!(candidates = total, kept = hits.len(), "vector query");
		Ok(hits)
	}

	fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
		if chunks.is_empty() { return Ok(vec![]); }
		let pb = ProgressBar::new(chunks.len() as u64);
		pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
		let mut out = Vec::with_capacity(chunks.len());
		for batch in chunks.chunks(self.batch_size) {
			let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
			let vecs = self.embedder.embed_batch(&texts)?;
			if vecs.len() != texts.len() {
				return Err(anyhow!("embedder returned {} vectors for {} texts", vecs.len(), texts.len()));
			}
			for v in &vecs {
				if v.len() != self.embedder.dim() { return Err(Error::DimensionMismatch { expected: self.embedder.dim(), actual: v.len() }.into()); }
			}
			out.extend(vecs);
			pb.inc(batch.len() as u64);
		}
		pb.finish_with_message("embedded");
		Ok(out)
	}

	fn block<T, F>(&self, what: &str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		block_with_timeout(&self.runtime, self.timeout, what, fut)
	}
}

async fn count_rows(db: &Connection, name: &str) -> Result<usize> {
	match open_existing(db, name).await? {
		Some(table) => Ok(table.count_rows(None).await?),
		None => Ok(0),
	}
}

async fn replace_rows(db: &Connection, name: &str, dim: usize, schema: Arc<Schema>, batches: Vec<Result<RecordBatch, ArrowError>>) -> Result<()> {
	let table = ensure_chunk_table(db, name, dim).await?;
	// previous epoch's rows are gone before the new ones land
	table.delete("true").await?;
	if !batches.is_empty() {
		let reader = Box::new(RecordBatchIterator::new(batches.into_iter(), schema));
		table.add(reader).execute().await?;
	}
	Ok(())
}

async fn nearest_rows(db: &Connection, name: &str, query_vec: Vec<f32>, k: usize) -> Result<Vec<RetrievalHit>> {
	let Some(table) = open_existing(db, name).await? else { return Ok(vec![]); };
	if table.count_rows(None).await? == 0 { return Ok(vec![]); }
	let mut stream = table.vector_search(query_vec)?.distance_type(DistanceType::L2).limit(k).execute().await?;
	let mut rows = Vec::new();
	while let Some(batch) = stream.try_next().await? { read_hits(&batch, &mut rows)?; }
	Ok(rows)
}

fn block_with_timeout<T, F>(runtime: &Runtime, timeout: Duration, what: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	runtime.block_on(async { tokio::time::timeout(timeout, fut).await })
		.map_err(|_| Error::Timeout { what: what.to_string(), secs: timeout.as_secs() })?
}

fn distance_of(hit: &RetrievalHit) -> f32 {
	match hit.source_score { SourceScore::Distance(d) => d, _ => f32::INFINITY }
}

fn chunks_to_record_batch(schema: &Arc<Schema>, chunks: &[Chunk], vectors: &[Vec<f32>], dim: usize) -> Result<RecordBatch> {
	let ids: Vec<String> = chunks.iter().map(|c| c.id.storage_key()).collect();
	let filenames: Vec<String> = chunks.iter().map(|c| c.meta.filename.clone()).collect();
	let chunk_indices = chunks.iter().map(|c| i32::try_from(c.id.0)).collect::<Result<Vec<_>, _>>()?;
	let offsets = chunks.iter().map(|c| i64::try_from(c.offset)).collect::<Result<Vec<_>, _>>()?;
	let contents: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
	let vectors: Vec<Option<Vec<Option<f32>>>> = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect())).collect();
	let record_batch = RecordBatch::try_new(schema.clone(), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(filenames)),
		Arc::new(Int32Array::from(chunk_indices)),
		Arc::new(Int64Array::from(offsets)),
		Arc::new(StringArray::from(contents)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), i32::try_from(dim)?)),
	])?;
	Ok(record_batch)
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<T>())
		.ok_or_else(|| anyhow!("vector search result has no usable {} column", name))
}

fn read_hits(batch: &RecordBatch, out: &mut Vec<RetrievalHit>) -> Result<()> {
	let filenames = column::<StringArray>(batch, FILENAME_COLUMN)?;
	let contents = column::<StringArray>(batch, CONTENT_COLUMN)?;
	let distances = column::<Float32Array>(batch, DISTANCE_COLUMN)?;
	let positions = column::<Int32Array>(batch, CHUNK_INDEX_COLUMN)?;
	let mut rows: Vec<(i32, RetrievalHit)> = (0..batch.num_rows()).map(|i| (positions.value(i), RetrievalHit {
		text: contents.value(i).to_string(),
		meta: ChunkMeta::corpus(filenames.value(i)),
		source_score: SourceScore::Distance(distances.value(i)),
	})).collect();
	// equal distances resolve to corpus order
	rows.sort_by(|a, b| distance_of(&a.1).total_cmp(&distance_of(&b.1)).then(a.0.cmp(&b.0)));
	out.extend(rows.into_iter().map(|(_, h)| h));
	Ok(())
}

impl VectorIndexer for LanceVectorIndex {
	fn rebuild(&self, chunks: &[Chunk]) -> Result<usize> { LanceVectorIndex::rebuild(self, chunks) }
	fn query(&self, text: &str, k: usize, distance_threshold: f32) -> Result<Vec<RetrievalHit>> { LanceVectorIndex::query(self, text, k, distance_threshold) }
}
