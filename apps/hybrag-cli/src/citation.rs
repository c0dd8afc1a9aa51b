use hybrag_core::types::RerankedHit;

pub const PREVIEW_CHARS: usize = 333;

/// First `PREVIEW_CHARS` characters, with `...` when the text was cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() { format!("{}...", head) } else { head }
}

/// Numbered `filename` + preview blocks, one per hit.
pub fn format_citations(hits: &[RerankedHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, h)| format!("{}. From: {} [{}]\n{}\n", i + 1, h.meta.filename, h.meta.source_kind.as_str(), preview(&h.text)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybrag_core::types::ChunkMeta;

    #[test]
    fn preview_truncates_on_characters() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(400);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview(&"a".repeat(PREVIEW_CHARS)), "a".repeat(PREVIEW_CHARS));
    }

    #[test]
    fn citations_are_numbered() {
        let hits = vec![
            RerankedHit { text: "Paris.".into(), meta: ChunkMeta::corpus("france.pdf"), relevance: 1.0 },
            RerankedHit { text: "Web text".into(), meta: ChunkMeta::web("duckduckgo"), relevance: 0.1 },
        ];
        let out = format_citations(&hits);
        assert!(out.starts_with("1. From: france.pdf [corpus]\nParis.\n"));
        assert!(out.contains("2. From: duckduckgo [web]\nWeb text\n"));
    }
}
