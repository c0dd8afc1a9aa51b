use anyhow::Result;
use std::cmp::Ordering;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument, Term};
use tracing::debug;

use hybrag_core::types::{Chunk, RetrievalHit, SourceScore};

use crate::tantivy_utils::{build_schema, register_tokenizer, POSITION_FIELD, TEXT_FIELD};

struct Built {
	index: Index,
	reader: IndexReader,
	position_field: Field,
	text_field: Field,
}

/// In-memory BM25 index over one epoch's chunks.
///
/// Built once and never mutated; a new corpus means a new `LexicalIndex`.
pub struct LexicalIndex {
	chunks: Vec<Chunk>,
	built: Option<Built>,
}

impl LexicalIndex {
	/// An index that was never built. Every query returns nothing.
	pub fn empty() -> Self { Self { chunks: Vec::new(), built: None } }

	pub fn build(chunks: &[Chunk]) -> Result<Self> {
		if chunks.is_empty() { return Ok(Self::empty()); }
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let position_field = schema.get_field(POSITION_FIELD)?;
		let text_field = schema.get_field(TEXT_FIELD)?;
		// single thread keeps doc ids in corpus order
		let mut index_writer: IndexWriter = index.writer_with_num_threads(1, 50_000_000)?;
		for (position, c) in chunks.iter().enumerate() {
			index_writer.add_document(doc!(
				position_field => position as u64,
				text_field => c.text.as_str(),
			))?;
		}
		index_writer.commit()?;
		let reader = index.reader()?;
		reader.reload()?;
		debug!(chunks = chunks.len(), "built lexical index");
		Ok(Self { chunks: chunks.to_vec(), built: Some(Built { index, reader, position_field, text_field }) })
	}

	pub fn len(&self) -> usize { self.chunks.len() }

	pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

	/// Top `k` chunks by BM25 score; equal scores keep corpus order. Chunks
	/// sharing no term with the query score zero and fill the remaining slots.
	pub fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievalHit>> {
		let Some(built) = &self.built else { return Ok(vec![]); };
		if k == 0 { return Ok(vec![]); }

		let mut scores = vec![0f32; self.chunks.len()];
		let terms = self.query_terms(built, text)?;
		if !terms.is_empty() {
			let clauses: Vec<(Occur, Box<dyn Query>)> = terms
				.into_iter()
				.map(|t| (Occur::Should, Box::new(TermQuery::new(t, IndexRecordOption::WithFreqs)) as Box<dyn Query>))
				.collect();
			let q = BooleanQuery::new(clauses);
			let searcher = built.reader.searcher();
			let top_docs = searcher.search(&q, &TopDocs::with_limit(self.chunks.len()))?;
			for (score, addr) in top_docs {
				let doc: TantivyDocument = searcher.doc(addr)?;
				let position = doc.get_first(built.position_field).and_then(|v| v.as_u64())
					.ok_or_else(|| anyhow::anyhow!("lexical document without position"))?;
				if let Some(slot) = scores.get_mut(position as usize) { *slot = score; }
			}
		}

		let mut order: Vec<usize> = (0..self.chunks.len()).collect();
		// stable: equal scores stay in corpus order
		order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
		order.truncate(k);
		Ok(order.into_iter().map(|i| RetrievalHit::from_chunk(&self.chunks[i], SourceScore::Lexical(scores[i]))).collect())
	}

	fn query_terms(&self, built: &Built, text: &str) -> Result<Vec<Term>> {
		let mut analyzer = built.index.tokenizer_for_field(built.text_field)?;
		let mut stream = analyzer.token_stream(text);
		let mut terms: Vec<Term> = Vec::new();
		while stream.advance() {
			let term = Term::from_field_text(built.text_field, &stream.token().text);
			if !terms.contains(&term) { terms.push(term); }
		}
		Ok(terms)
	}
}
