//! Positional sliding-window chunking.
//!
//! Windows are measured in characters, not bytes, so multi-byte text is never
//! split inside a code point. There is no sentence or paragraph awareness.

use crate::config::ChunkingSettings;
use crate::error::Error;

/// One window produced by [`Chunker::split`], before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Character offset of the window start.
    pub offset: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    size: usize,
    overlap: usize,
    min_chars: usize,
}

impl Chunker {
    pub fn new(size: usize, overlap: usize, min_chars: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidConfig("chunk size must be > 0".to_string()));
        }
        if overlap >= size {
            return Err(Error::InvalidConfig(format!("chunk overlap {overlap} must be smaller than size {size}")));
        }
        Ok(Self { size, overlap, min_chars })
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self, Error> {
        Self::new(settings.size, settings.overlap, settings.min_chars)
    }

    pub fn stride(&self) -> usize {
        self.size - self.overlap
    }

    /// Cut `text` into overlapping windows. Window `i` starts at `i * stride`
    /// characters; windows whose trimmed length is `<= min_chars` are dropped.
    pub fn split(&self, text: &str) -> Vec<Window> {
        // byte offset of every char, plus the end of the string
        let mut bounds: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let char_len = bounds.len();
        bounds.push(text.len());

        let mut windows = Vec::new();
        let mut start = 0usize;
        while start < char_len {
            let end = (start + self.size).min(char_len);
            let slice = &text[bounds[start]..bounds[end]];
            if slice.trim().chars().count() > self.min_chars {
                windows.push(Window { offset: start, text: slice.to_string() });
            }
            start += self.stride();
        }
        windows
    }
}

impl Default for Chunker {
    fn default() -> Self {
        let d = ChunkingSettings::default();
        Self { size: d.size, overlap: d.overlap, min_chars: d.min_chars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_stride() {
        let chunker = Chunker::new(10, 3, 0).unwrap();
        let text: String = ('a'..='z').collect();
        let windows = chunker.split(&text);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.offset, i * 7);
            assert!(w.offset + w.text.chars().count() <= 26);
        }
        assert_eq!(windows[0].text, "abcdefghij");
        assert_eq!(windows[1].text, "hijklmnopq");
        assert_eq!(windows.last().unwrap().text, "vwxyz");
    }

    #[test]
    fn short_document_is_one_chunk() {
        let chunker = Chunker::default();
        let windows = chunker.split("The capital of France is Paris.");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].offset, 0);
        assert_eq!(windows[0].text, "The capital of France is Paris.");
    }

    #[test]
    fn noise_is_dropped() {
        let chunker = Chunker::default();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("    \n\t   \n").is_empty());
        assert!(chunker.split("  short  ").is_empty());
        assert!(chunker.split("0123456789").is_empty());
        assert_eq!(chunker.split("0123456789a").len(), 1);
    }

    #[test]
    fn multibyte_text_is_split_on_chars() {
        let chunker = Chunker::new(4, 1, 0).unwrap();
        let windows = chunker.split("ééééééé");
        assert_eq!(windows[0].text, "éééé");
        assert_eq!(windows[1].offset, 3);
        assert_eq!(windows[1].text, "éééé");
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(Chunker::new(5, 5, 0).is_err());
        assert!(Chunker::new(0, 0, 0).is_err());
    }
}
