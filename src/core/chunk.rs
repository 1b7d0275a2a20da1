//! Chunk representation for caption-rs.
//!
//! Chunks are the display units produced by the segmenter. Each chunk keeps
//! its position within the original stream and the rule that closed it, so
//! consumers can reconstruct the text and reason about where it was cut.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Represents one emitted run of text.
///
/// Chunks are emitted in order; concatenating their `content` fields
/// reproduces the segmented text.
///
/// # Examples
///
/// ```
/// use caption_rs::core::{Chunk, SplitReason};
///
/// let chunk = Chunk::new("你好，".to_string(), 0..9, 0, SplitReason::Clause);
/// assert_eq!(chunk.size(), 9);
/// assert_eq!(chunk.char_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk content.
    pub content: String,

    /// Byte range in the original text or stream.
    pub byte_range: Range<usize>,

    /// Sequential index within the stream (0-based).
    pub index: usize,

    /// Rule that closed this chunk.
    pub reason: SplitReason,
}

/// The rule that caused a chunk boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitReason {
    /// Minimum length reached.
    Length,
    /// Sentence-terminating punctuation.
    SentenceEnd,
    /// A newline.
    Newline,
    /// Clause punctuation outside Markdown and emoji runs.
    Clause,
    /// Remaining text flushed at end of stream.
    EndOfStream,
}

impl SplitReason {
    /// Returns the reason as a short identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::SentenceEnd => "sentence_end",
            Self::Newline => "newline",
            Self::Clause => "clause",
            Self::EndOfStream => "end_of_stream",
        }
    }
}

impl fmt::Display for SplitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Chunk {
    /// Creates a new chunk.
    ///
    /// # Arguments
    ///
    /// * `content` - Chunk content.
    /// * `byte_range` - Byte range in the original text.
    /// * `index` - Sequential index within the stream.
    /// * `reason` - Rule that closed the chunk.
    #[must_use]
    pub const fn new(
        content: String,
        byte_range: Range<usize>,
        index: usize,
        reason: SplitReason,
    ) -> Self {
        Self {
            content,
            byte_range,
            index,
            reason,
        }
    }

    /// Returns the size of the chunk in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns the number of user-perceived characters (grapheme clusters).
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.content.graphemes(true).count()
    }

    /// Checks if the chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Checks if the chunk holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Returns the start byte offset in the original text.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.byte_range.start
    }

    /// Returns the end byte offset in the original text.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.byte_range.end
    }

    /// Checks if this chunk's byte range contains a specific byte offset.
    #[must_use]
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.byte_range.contains(&offset)
    }

    /// Returns a preview of the chunk content (first N grapheme clusters).
    ///
    /// # Arguments
    ///
    /// * `max_graphemes` - Maximum number of grapheme clusters to include.
    #[must_use]
    pub fn preview(&self, max_graphemes: usize) -> &str {
        let end = self
            .content
            .grapheme_indices(true)
            .nth(max_graphemes)
            .map_or(self.content.len(), |(offset, _)| offset);
        &self.content[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_new() {
        let chunk = Chunk::new("Hello".to_string(), 0..5, 0, SplitReason::Length);
        assert_eq!(chunk.content, "Hello");
        assert_eq!(chunk.byte_range, 0..5);
        assert_eq!(chunk.index, 0);
        assert_eq!(chunk.reason, SplitReason::Length);
    }

    #[test]
    fn test_chunk_size_and_chars() {
        let chunk = Chunk::new("面条🍜".to_string(), 0..10, 0, SplitReason::Length);
        assert_eq!(chunk.size(), 10);
        assert_eq!(chunk.char_count(), 3);
    }

    #[test]
    fn test_chunk_offsets() {
        let chunk = Chunk::new("world".to_string(), 7..12, 1, SplitReason::Length);
        assert_eq!(chunk.start(), 7);
        assert_eq!(chunk.end(), 12);
        assert!(chunk.contains_offset(7));
        assert!(!chunk.contains_offset(12));
    }

    #[test]
    fn test_chunk_preview_respects_graphemes() {
        let chunk = Chunk::new(
            "👨‍👩‍👧好吃".to_string(),
            0..24,
            0,
            SplitReason::EndOfStream,
        );
        assert_eq!(chunk.preview(1), "👨‍👩‍👧");
        assert_eq!(chunk.preview(100), chunk.content);
    }

    #[test]
    fn test_chunk_blank() {
        let chunk = Chunk::new(" \n".to_string(), 0..2, 0, SplitReason::Newline);
        assert!(chunk.is_blank());
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_split_reason_display() {
        assert_eq!(SplitReason::SentenceEnd.to_string(), "sentence_end");
        assert_eq!(SplitReason::EndOfStream.as_str(), "end_of_stream");
    }

    #[test]
    fn test_chunk_serialization() {
        let chunk = Chunk::new("test".to_string(), 0..4, 0, SplitReason::Clause);
        let json = serde_json::to_string(&chunk).unwrap();
        assert!(json.contains("\"reason\":\"clause\""));

        let deserialized: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, chunk);
    }
}
