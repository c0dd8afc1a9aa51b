use tracing::{debug, warn};

use hybrag_core::config::WebSettings;
use hybrag_core::traits::WebSearcher;
use hybrag_core::types::{ChunkMeta, RetrievalHit, SourceScore};

use crate::duckduckgo::DuckDuckGoSearcher;

/// Filename attached to every web hit.
pub const WEB_FILENAME: &str = "duckduckgo";

/// Web retrieval source. Never fails: every error becomes an empty result.
pub struct WebSource {
    searcher: Option<Box<dyn WebSearcher>>,
}

impl WebSource {
    pub fn new(searcher: Box<dyn WebSearcher>) -> Self { Self { searcher: Some(searcher) } }

    /// A source that never performs I/O.
    pub fn disabled() -> Self { Self { searcher: None } }

    /// DuckDuckGo when `web.enabled`, otherwise disabled. A client that cannot
    /// be built disables the source instead of failing startup.
    pub fn from_settings(settings: &WebSettings) -> Self {
        if !settings.enabled { return Self::disabled(); }
        match DuckDuckGoSearcher::new(settings) {
            Ok(searcher) => Self::new(Box::new(searcher)),
            Err(e) => { warn!(error = %e, "web search unavailable, continuing without it"); Self::disabled() }
        }
    }

    pub fn is_enabled(&self) -> bool { self.searcher.is_some() }

    pub fn query(&self, text: &str, k: usize) -> Vec<RetrievalHit> {
        let Some(searcher) = &self.searcher else { return vec![]; };
        if k == 0 { return vec![]; }
        match searcher.search(text, k) {
            Ok(results) => {
                let hits: Vec<RetrievalHit> = results
                    .into_iter()
                    .filter(|r| !r.snippet.trim().is_empty())
                    .take(k)
                    .map(|r| RetrievalHit { text: r.snippet, meta: ChunkMeta::web(WEB_FILENAME), source_score: SourceScore::Unscored })
                    .collect();
                debug!(hits = hits.len(), "web source");
                hits
            }
            Err(e) => {
                warn!(error = %e, "web search failed, continuing without web results");
                vec![]
            }
        }
    }
}
