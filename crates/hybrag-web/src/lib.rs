//! hybrag-web
//!
//! Public web search as a third retrieval source. Failures never leave this
//! crate: the source degrades to zero results.

pub mod duckduckgo;
pub mod source;

pub use duckduckgo::{parse_results, DuckDuckGoSearcher};
pub use source::{WebSource, WEB_FILENAME};
