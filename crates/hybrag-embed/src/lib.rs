//! hybrag-embed
//!
//! Local model capabilities backed by candle: the dense embedder used by the
//! vector index and the cross-encoder used by the reranker. Both have
//! deterministic fakes selected by `APP_USE_FAKE_EMBEDDINGS=1`.

use anyhow::Result;
use std::path::Path;
use std::time::Instant;

use candle_core::{Device, DType};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{XLMRobertaModel, Config as XLMRobertaConfig};
use tokenizers::Tokenizer;
use tracing::{info, warn};

use hybrag_core::config::ModelSettings;
use hybrag_core::traits::Embedder;

pub mod device;
pub mod pool;
pub mod rerank;
pub mod tokenize;
pub mod weights;

pub use pool::masked_mean_l2;
pub use rerank::{get_default_scorer, CrossEncoderScorer, OverlapScorer};

use crate::device::select_device;
use crate::tokenize::tokenize_on_device;
use crate::weights::{hidden_size, load_tokenizer, load_weights, read_config_json, resolve_model_dir};

pub const FAKE_DIM: usize = 1024;

/// XLM-RoBERTa sentence embedder (BGE-M3 by default): masked mean pooling + L2.
pub struct EmbeddingModel { model: XLMRobertaModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl EmbeddingModel {
    pub fn new(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading embedding model");
        let tokenizer = load_tokenizer(model_dir)?;
        let config_json = read_config_json(model_dir)?;
        let config: XLMRobertaConfig = serde_json::from_str(&config_json)?;
        let dim = hidden_size(&config_json)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, max_len, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let inputs = tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden = self.model.forward(&inputs.input_ids, &inputs.attention_mask, &inputs.token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &inputs.attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        anyhow::ensure!(emb.len() == self.dim, hybrag_core::error::Error::DimensionMismatch { expected: self.dim, actual: emb.len() });
        if start.elapsed().as_millis() > 100 { warn!(ms = start.elapsed().as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { texts.iter().map(|t| self.embed_text(t)).collect() }
}

/// Hashes whitespace tokens into buckets; deterministic and L2-normalized.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim } } }

impl FakeEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() { let mut hasher = XxHash64::with_seed(0); token.hash(&mut hasher); let h = hasher.finish(); let idx = (h as usize) % self.dim; let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32); v[idx] += val + (i as f32 % 3.0) * 0.01; }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
}

pub fn use_fake_models() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Embedder for ingestion and queries. Fails when the model cannot be loaded.
pub fn get_default_embedder(settings: &ModelSettings) -> Result<Box<dyn Embedder>> {
    if use_fake_models() { info!("using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::new(FAKE_DIM))); }
    let model_dir = resolve_model_dir(&settings.embedding_dir, "APP_MODEL_DIR")?;
    Ok(Box::new(EmbeddingModel::new(&model_dir, settings.max_len)?))
}
