//! Fixed-size character chunker.

use serde::Serialize;

/// A positional window over a document string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    /// Char offset of the first character.
    pub start: usize,
    /// Char offset one past the last character.
    pub end: usize,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits text into contiguous windows of at most `max_chars` characters.
///
/// Boundaries are purely positional and may fall mid-word; they never fall
/// inside a UTF-8 sequence.
#[derive(Debug, Clone, Copy)]
pub struct CharChunker {
    pub max_chars: usize,
}

impl CharChunker {
    /// `max_chars` is clamped to at least 1.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars: max_chars.max(1) }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut start_byte = 0;
        let mut start_char = 0;
        let mut count = 0;

        for (byte_idx, _) in text.char_indices() {
            if count == self.max_chars {
                chunks.push(Chunk {
                    index: chunks.len(),
                    text: text[start_byte..byte_idx].to_string(),
                    start: start_char,
                    end: start_char + count,
                });
                start_byte = byte_idx;
                start_char += count;
                count = 0;
            }
            count += 1;
        }
        if count > 0 {
            chunks.push(Chunk {
                index: chunks.len(),
                text: text[start_byte..].to_string(),
                start: start_char,
                end: start_char + count,
            });
        }
        chunks
    }
}

impl Default for CharChunker {
    fn default() -> Self {
        Self::new(1024)
    }
}
