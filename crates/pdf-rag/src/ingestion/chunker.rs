//! Recursive character splitting with a fixed character overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// A window of the input text, with character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan<'a> {
    /// First character (inclusive)
    pub start: usize,
    /// Last character (exclusive)
    pub end: usize,
    /// The text between `start` and `end`
    pub text: &'a str,
}

impl TextSpan<'_> {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits text into windows of at most `chunk_size` characters.
///
/// Each window ends at the best available break: paragraph, line,
/// sentence, word, and finally a hard cut. Consecutive windows share
/// exactly `chunk_overlap` characters. Windows holding only whitespace
/// are dropped.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split every document, carrying its metadata onto each chunk
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for doc in documents {
            let spans = self.split_text(&doc.content);
            tracing::debug!(
                source = doc.source().unwrap_or_default(),
                page = doc.page_number().unwrap_or_default(),
                "Split page into {} chunks",
                spans.len()
            );

            chunks.extend(spans.into_iter().enumerate().map(|(index, span)| {
                Chunk::from_parent(doc, span.text.to_string(), index, span.start, span.end)
            }));
        }

        chunks
    }

    /// Split text into overlapping windows
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<TextSpan<'a>> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every character, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut spans = Vec::new();
        let mut start = 0usize;

        loop {
            let end = if total - start <= self.chunk_size {
                total
            } else {
                self.find_break(text, &offsets, start)
            };

            let window = &text[offsets[start]..offsets[end]];
            if !window.trim().is_empty() {
                spans.push(TextSpan {
                    start,
                    end,
                    text: window,
                });
            }

            if end == total {
                break;
            }
            start = end - self.chunk_overlap;
        }

        spans
    }

    /// Character index ending the window that starts at `start`
    fn find_break(&self, text: &str, offsets: &[usize], start: usize) -> usize {
        let limit = start + self.chunk_size;
        let base = offsets[start];
        let window = &text[base..offsets[limit]];

        let to_char = |byte: usize| {
            offsets
                .binary_search(&(base + byte))
                .unwrap_or_else(|insert_at| insert_at)
        };
        // A break must leave more than the overlap behind, or the next window
        // would not advance
        let usable = |end: usize| end > start + self.chunk_overlap;

        let candidates = [
            window.rfind("\n\n").map(|b| b + 2),
            window.rfind('\n').map(|b| b + 1),
            window
                .split_sentence_bound_indices()
                .map(|(b, _)| b)
                .filter(|&b| b > 0)
                .last(),
            window
                .split_word_bound_indices()
                .map(|(b, _)| b)
                .filter(|&b| b > 0)
                .last(),
        ];

        candidates
            .into_iter()
            .flatten()
            .map(to_char)
            .find(|&end| usable(end))
            .unwrap_or(limit)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 1,
        }
    }
}
