use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor, DType};
use tokenizers::{Encoding, Tokenizer};

/// XLM-RoBERTa padding id.
const PAD_ID: u32 = 1;

pub struct DeviceInputs {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<DeviceInputs> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    to_device_inputs(&enc, max_len, device)
}

/// Encode a `(query, candidate)` pair as one sequence for a cross-encoder.
pub fn tokenize_pair_on_device(tokenizer: &Tokenizer, query: &str, candidate: &str, max_len: usize, device: &Device) -> Result<DeviceInputs> {
    let enc = tokenizer.encode((query, candidate), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    to_device_inputs(&enc, max_len, device)
}

fn to_device_inputs(enc: &Encoding, max_len: usize, device: &Device) -> Result<DeviceInputs> {
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); }
    if ids.len() < max_len { let pad = max_len - ids.len(); ids.extend(std::iter::repeat(PAD_ID).take(pad)); mask.extend(std::iter::repeat(0).take(pad)); }
    let input_ids = Tensor::from_iter(ids, device)?.reshape((1, max_len))?;
    let attention_mask = Tensor::from_iter(mask, device)?.reshape((1, max_len))?;
    let token_type_ids = Tensor::zeros((1, max_len), DType::I64, device)?;
    Ok(DeviceInputs { input_ids, attention_mask, token_type_ids })
}
