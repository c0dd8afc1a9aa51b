//! Locating and loading local model files (tokenizer, config, weights).

use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use tracing::info;

use hybrag_core::config::expand_path;

/// Resolve a model directory: the `env_var` override wins when it points to an
/// existing directory, then the configured path.
pub fn resolve_model_dir(configured: &str, env_var: &str) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(env_var) { let p = expand_path(&dir); if p.exists() { info!(dir = %p.display(), "using {}", env_var); return Ok(p); } }
    let p = expand_path(configured); if p.exists() { info!(dir = %p.display(), "using model dir"); return Ok(p); }
    Err(anyhow!("Could not locate model directory {} (set {} to override)", configured, env_var))
}

pub fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_path = model_dir.join("tokenizer.json");
    Tokenizer::from_file(&tokenizer_path)
        .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))
}

pub fn read_config_json(model_dir: &Path) -> Result<String> {
    let config_path = model_dir.join("config.json");
    std::fs::read_to_string(&config_path)
        .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))
}

/// `hidden_size` from a Hugging Face `config.json`.
pub fn hidden_size(config_json: &str) -> Result<usize> {
    let value: serde_json::Value = serde_json::from_str(config_json)?;
    value.get("hidden_size").and_then(serde_json::Value::as_u64).map(|h| h as usize)
        .ok_or_else(|| anyhow!("config.json has no hidden_size"))
}

/// Prefer `model.safetensors`, fall back to `pytorch_model.bin`.
pub fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let weights_path = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&weights_path)
        .map_err(|e| anyhow!("Failed to read weights from {}: {}", weights_path.display(), e))?;
    Ok(weights.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_hidden_size() {
        assert_eq!(hidden_size(r#"{"hidden_size": 1024, "vocab_size": 250002}"#).unwrap(), 1024);
        assert!(hidden_size("{}").is_err());
    }

    #[test]
    fn missing_model_dir_is_an_error() {
        let err = resolve_model_dir("/definitely/not/here", "HYBRAG_TEST_UNSET_MODEL_DIR").unwrap_err();
        assert!(err.to_string().contains("Could not locate model directory"));
    }
}
