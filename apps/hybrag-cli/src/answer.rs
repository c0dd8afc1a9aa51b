use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use hybrag_core::config::GenerationSettings;

/// Reply the model is told to give when the context does not hold the answer.
pub const NO_ANSWER_REPLY: &str = "Sorry, I cannot answer this question from the available context.";
/// Returned when the model answers with nothing.
pub const NO_RESPONSE: &str = "No response.";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Grounded prompt: answer only from `context`, in paragraphs.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a helpful expert assistant. Answer ONLY based on the provided CONTEXT below. \
         If the answer is not present in the context, reply: '{NO_ANSWER_REPLY}'\n\n\
         Guidelines:\n\
         - Provide a brief but informative explanation.\n\
         - Write at least two paragraphs, with details, examples and facts found in the context.\n\
         - Do NOT list just bullet points; use paragraph form.\n\
         - Do not invent or assume information not present in the context.\n\n\
         CONTEXT:\n{context}\n\n\
         QUESTION: {question}\n\n\
         ANSWER:"
    )
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("failed to build generation HTTP client")?;
        Ok(Self { client, endpoint: settings.endpoint.clone(), model: settings.model.clone() })
    }

    /// The model's answer, `NO_RESPONSE` when it is blank, or the error text
    /// when generation fails. Never an `Err`.
    pub fn answer(&self, question: &str, context: &str) -> String {
        match self.generate(&build_prompt(question, context)) {
            Ok(text) if text.trim().is_empty() => NO_RESPONSE.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                format!("{:#}", e)
            }
        }
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest { model: &self.model, prompt, stream: false };
        let response = self.client.post(&self.endpoint).json(&body).send()
            .with_context(|| format!("request to {} failed", self.endpoint))?
            .error_for_status()?;
        let parsed: GenerateResponse = response.json().context("invalid generation response")?;
        debug!(chars = parsed.response.len(), "generated answer");
        Ok(parsed.response)
    }
}
