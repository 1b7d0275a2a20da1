//! Segmentation of text arriving in fragments.

use crate::core::Chunk;
use crate::error::{Result, SegmentError};
use crate::segment::config::SegmentConfig;
use crate::segment::state::SegmentState;
use unicode_segmentation::UnicodeSegmentation;

/// Incremental segmenter fed by network fragments.
///
/// Fragments may split a grapheme cluster (an emoji followed by its skin-tone
/// modifier, `\r` followed by `\n`) or, through [`push_bytes`], a UTF-8
/// sequence. The last grapheme seen is therefore held back until more input
/// or [`finish`] arrives, which makes the output independent of how the
/// stream was fragmented. A trailing line feed is the exception: no code
/// point extends a grapheme across it, so it is cut at once.
///
/// [`push_bytes`]: StreamSegmenter::push_bytes
/// [`finish`]: StreamSegmenter::finish
///
/// # Examples
///
/// ```
/// use caption_rs::segment::StreamSegmenter;
///
/// let mut segmenter = StreamSegmenter::streaming();
/// let mut chunks = Vec::new();
/// for fragment in ["你好，", "世界。", "下一句"] {
///     chunks.extend(segmenter.push_str(fragment));
/// }
/// chunks.extend(segmenter.finish().unwrap());
///
/// let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
/// assert_eq!(contents, vec!["你好，", "世界。", "下一句"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamSegmenter {
    config: SegmentConfig,
    state: SegmentState,
    /// Last grapheme received; it may still be extended.
    tail: String,
    /// Bytes of an incomplete UTF-8 sequence.
    partial: Vec<u8>,
    /// Bytes decoded so far, for error offsets.
    decoded: usize,
}

impl StreamSegmenter {
    /// Creates a segmenter with the given rules.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    pub fn new(config: SegmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Creates a segmenter with the live-stream rules.
    #[must_use]
    pub fn streaming() -> Self {
        Self::with_config(SegmentConfig::streaming())
    }

    /// Creates a segmenter with the whole-reply rules.
    #[must_use]
    pub fn whole() -> Self {
        Self::with_config(SegmentConfig::whole())
    }

    fn with_config(config: SegmentConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the active rules.
    #[must_use]
    pub const fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// Feeds a text fragment and returns the chunks it completed.
    pub fn push_str(&mut self, fragment: &str) -> Vec<Chunk> {
        if fragment.is_empty() {
            return Vec::new();
        }

        let mut text = std::mem::take(&mut self.tail);
        text.push_str(fragment);

        let mut graphemes = text.graphemes(true);
        let last = graphemes.next_back();
        let mut chunks: Vec<Chunk> = graphemes
            .filter_map(|grapheme| self.state.feed(grapheme, &self.config))
            .collect();
        if let Some(last) = last {
            if last.ends_with('\n') {
                chunks.extend(self.state.feed(last, &self.config));
            } else {
                self.tail.push_str(last);
            }
        }
        chunks
    }

    /// Feeds raw bytes and returns the chunks they completed.
    ///
    /// A UTF-8 sequence cut at the end of `bytes` is kept until the next call.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::InvalidUtf8`] with the stream offset of the
    /// first invalid byte. The undecoded bytes are discarded.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<Vec<Chunk>> {
        self.partial.extend_from_slice(bytes);

        let valid = match std::str::from_utf8(&self.partial) {
            Ok(_) => self.partial.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                let offset = self.decoded + e.valid_up_to();
                self.partial.clear();
                return Err(SegmentError::InvalidUtf8 { offset }.into());
            }
        };

        let rest = self.partial.split_off(valid);
        let complete = std::mem::replace(&mut self.partial, rest);
        self.decoded += valid;
        let text = String::from_utf8(complete).map_err(SegmentError::from)?;
        Ok(self.push_str(&text))
    }

    /// Ends the stream and returns the final chunk, if any.
    ///
    /// The remainder is emitted regardless of length. A whitespace-only
    /// remainder is dropped. The segmenter is reset afterwards and can be
    /// reused for a new stream.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::IncompleteUtf8`] if the byte stream stopped
    /// inside a UTF-8 sequence.
    pub fn finish(&mut self) -> Result<Option<Chunk>> {
        if !self.partial.is_empty() {
            let pending = self.partial.len();
            self.reset();
            return Err(SegmentError::IncompleteUtf8 { pending }.into());
        }

        let tail = std::mem::take(&mut self.tail);
        let chunk = if tail.is_empty() {
            None
        } else {
            self.state.feed(&tail, &self.config)
        }
        .or_else(|| self.state.flush());

        if chunk.is_none() {
            let dropped = self.state.take_pending();
            if !dropped.is_empty() {
                tracing::debug!(bytes = dropped.len(), "dropping blank remainder");
            }
        }

        self.reset();
        Ok(chunk)
    }

    /// Returns the text received but not yet emitted.
    #[must_use]
    pub fn pending(&self) -> String {
        format!("{}{}", self.state.pending(), self.tail)
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.pending().is_empty() && self.tail.is_empty() && self.partial.is_empty()
    }

    /// Number of chunks emitted in the current stream.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.state.emitted()
    }

    fn reset(&mut self) {
        self.state = SegmentState::default();
        self.tail.clear();
        self.partial.clear();
        self.decoded = 0;
    }
}
