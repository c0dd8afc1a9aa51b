use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use hybrag_core::config::WebSettings;
use hybrag_core::traits::WebSearcher;
use hybrag_core::types::WebResult;

#[derive(Clone)]
struct ResultSelectors {
    result: Selector,
    title: Selector,
    snippet: Selector,
}

impl ResultSelectors {
    fn new() -> Result<Self> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| anyhow!("invalid selector {}: {}", s, e));
        Ok(Self {
            result: parse("div.result:not(.result--ad)")?,
            title: parse("a.result__a")?,
            snippet: parse(".result__snippet")?,
        })
    }
}

/// DuckDuckGo's HTML endpoint, queried with a form POST.
pub struct DuckDuckGoSearcher {
    client: Client,
    endpoint: String,
    selectors: ResultSelectors,
}

impl DuckDuckGoSearcher {
    pub fn new(settings: &WebSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("failed to build web search HTTP client")?;
        Ok(Self { client, endpoint: settings.endpoint.clone(), selectors: ResultSelectors::new()? })
    }
}

impl WebSearcher for DuckDuckGoSearcher {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>> {
        let response = self.client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .send()
            .context("web search request failed")?
            .error_for_status()
            .context("web search returned an error status")?;
        let html = response.text().context("failed to read web search response")?;
        let results = extract(&html, max_results, &self.selectors);
        debug!(results = results.len(), "web search");
        Ok(results)
    }
}

/// Organic results with a snippet from a DuckDuckGo HTML page, at most
/// `max_results`. Sponsored blocks are skipped.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<WebResult>> {
    Ok(extract(html, max_results, &ResultSelectors::new()?))
}

fn extract(html: &str, max_results: usize, selectors: &ResultSelectors) -> Vec<WebResult> {
    let document = Html::parse_document(html);
    document
        .select(&selectors.result)
        .filter_map(|node| {
            let title_el = node.select(&selectors.title).next()?;
            let snippet = node.select(&selectors.snippet).next().map(collapsed_text).unwrap_or_default();
            if snippet.is_empty() { return None; }
            Some(WebResult {
                title: collapsed_text(title_el),
                url: title_el.value().attr("href").unwrap_or_default().to_string(),
                snippet,
            })
        })
        .take(max_results)
        .collect()
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
