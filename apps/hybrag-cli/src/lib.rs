//! hybrag-cli
//!
//! Answer generation against a local Ollama server, the citation
//! formatting and the interactive loop used by the `hybrag` binary.

pub mod answer;
pub mod chat;
pub mod citation;

pub use answer::{build_prompt, OllamaClient, NO_ANSWER_REPLY, NO_RESPONSE};
pub use chat::{run_chat, CHAT_PROMPT};
pub use citation::{format_citations, preview, PREVIEW_CHARS};
