//! Segmenter configuration.

use crate::error::{Result, SegmentError};

/// Minimum chunk length, in grapheme clusters, when re-chunking a complete
/// workflow reply.
pub const WHOLE_MIN_CHARS: usize = 3;

/// Minimum chunk length when re-chunking a live stream: a chunk is cut once
/// more than ten characters have accumulated.
pub const STREAMING_MIN_CHARS: usize = 11;

/// Rules deciding where the segmenter may cut.
///
/// The clause rule only fires outside Markdown and emoji runs; the sentence
/// and newline rules always fire. The length rule is held back by those runs
/// too unless `force_length` is set.
///
/// # Examples
///
/// ```
/// use caption_rs::segment::SegmentConfig;
///
/// let config = SegmentConfig::streaming().min_chars(20);
/// assert!(config.split_on_sentence_end);
/// assert_eq!(config.min_chars, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Length (grapheme clusters) at which the buffer is cut.
    pub min_chars: usize,
    /// Cut after `。！？.!?`.
    pub split_on_sentence_end: bool,
    /// Cut after a line break.
    pub split_on_newline: bool,
    /// Cut after `，,、`.
    pub split_on_clause: bool,
    /// Apply the length rule inside Markdown and emoji runs as well.
    pub force_length: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self::streaming()
    }
}

impl SegmentConfig {
    /// Length-only rules for re-chunking a fully materialized reply.
    #[must_use]
    pub const fn whole() -> Self {
        Self {
            min_chars: WHOLE_MIN_CHARS,
            split_on_sentence_end: false,
            split_on_newline: false,
            split_on_clause: false,
            force_length: false,
        }
    }

    /// Punctuation-aware rules for re-chunking a live token stream.
    #[must_use]
    pub const fn streaming() -> Self {
        Self {
            min_chars: STREAMING_MIN_CHARS,
            split_on_sentence_end: true,
            split_on_newline: true,
            split_on_clause: true,
            force_length: true,
        }
    }

    /// Sets the length rule.
    #[must_use]
    pub const fn min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Sets whether sentence terminators force a cut.
    #[must_use]
    pub const fn split_on_sentence_end(mut self, enabled: bool) -> Self {
        self.split_on_sentence_end = enabled;
        self
    }

    /// Sets whether line breaks force a cut.
    #[must_use]
    pub const fn split_on_newline(mut self, enabled: bool) -> Self {
        self.split_on_newline = enabled;
        self
    }

    /// Sets whether clause punctuation cuts.
    #[must_use]
    pub const fn split_on_clause(mut self, enabled: bool) -> Self {
        self.split_on_clause = enabled;
        self
    }

    /// Sets whether the length rule ignores Markdown and emoji runs.
    #[must_use]
    pub const fn force_length(mut self, enabled: bool) -> Self {
        self.force_length = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidConfig`] when `min_chars` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.min_chars == 0 {
            return Err(SegmentError::InvalidConfig {
                reason: "min_chars must be > 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let whole = SegmentConfig::whole();
        assert_eq!(whole.min_chars, 3);
        assert!(!whole.split_on_sentence_end);
        assert!(!whole.split_on_clause);
        assert!(!whole.force_length);

        let streaming = SegmentConfig::streaming();
        assert_eq!(streaming.min_chars, 11);
        assert!(streaming.split_on_newline);
        assert!(streaming.force_length);
        assert_eq!(SegmentConfig::default(), streaming);
    }

    #[test]
    fn test_builder() {
        let config = SegmentConfig::whole()
            .min_chars(5)
            .split_on_newline(true)
            .split_on_clause(true)
            .split_on_sentence_end(true)
            .force_length(true);
        assert_eq!(config.min_chars, 5);
        assert!(config.split_on_newline);
        assert!(config.split_on_clause);
        assert!(config.split_on_sentence_end);
        assert!(config.force_length);
    }

    #[test]
    fn test_validate() {
        assert!(SegmentConfig::whole().validate().is_ok());
        assert!(SegmentConfig::whole().min_chars(0).validate().is_err());
    }
}
