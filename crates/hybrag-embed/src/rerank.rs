//! Cross-encoder relevance scoring for the rerank stage.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

use candle_core::{Device, DType, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaForSequenceClassification};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use hybrag_core::config::ModelSettings;
use hybrag_core::traits::RelevanceScorer;

use crate::device::select_device;
use crate::tokenize::tokenize_pair_on_device;
use crate::use_fake_models;
use crate::weights::{load_tokenizer, load_weights, read_config_json, resolve_model_dir};

/// `(query, candidate)` pairs through an XLM-RoBERTa sequence classifier with
/// a single output logit (bge-reranker-base by default). Higher is more relevant.
pub struct CrossEncoderScorer {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
}

impl CrossEncoderScorer {
    pub fn new(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading cross-encoder");
        let tokenizer = load_tokenizer(model_dir)?;
        let config: XLMRobertaConfig = serde_json::from_str(&read_config_json(model_dir)?)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = XLMRobertaForSequenceClassification::new(1, &config, vb)?;
        Ok(Self { model, tokenizer, device, max_len })
    }

    fn score_pair(&self, query: &str, candidate: &str) -> Result<f32> {
        let inputs = tokenize_pair_on_device(&self.tokenizer, query, candidate, self.max_len, &self.device)?;
        let logits: Tensor = self.model.forward(&inputs.input_ids, &inputs.attention_mask, &inputs.token_type_ids)?;
        let values: Vec<f32> = logits.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.flatten_all()?.to_vec1()?;
        values.first().copied().ok_or_else(|| anyhow::anyhow!("cross-encoder returned no logits"))
    }
}

impl RelevanceScorer for CrossEncoderScorer {
    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        let scores = candidates.iter().map(|c| self.score_pair(query, c)).collect::<Result<Vec<_>>>()?;
        debug!(candidates = candidates.len(), "scored candidates");
        Ok(scores)
    }
}

/// Fraction of the query's distinct alphanumeric tokens that appear in the
/// candidate. Deterministic stand-in for the cross-encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlapScorer;

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

impl RelevanceScorer for OverlapScorer {
    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        let q = tokens(query);
        if q.is_empty() { return Ok(vec![0.0; candidates.len()]); }
        Ok(candidates.iter().map(|c| {
            let c = tokens(c);
            q.iter().filter(|t| c.contains(*t)).count() as f32 / q.len() as f32
        }).collect())
    }
}

/// Scorer for the rerank stage. Fails when the model cannot be loaded.
pub fn get_default_scorer(settings: &ModelSettings) -> Result<Box<dyn RelevanceScorer>> {
    if use_fake_models() { info!("using OverlapScorer"); return Ok(Box::new(OverlapScorer)); }
    let model_dir = resolve_model_dir(&settings.reranker_dir, "APP_RERANKER_DIR")?;
    Ok(Box::new(CrossEncoderScorer::new(&model_dir, settings.max_len)?))
}
