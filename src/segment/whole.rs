//! Segmentation of a fully materialized string.

use crate::core::Chunk;
use crate::error::Result;
use crate::segment::config::SegmentConfig;
use crate::segment::state::SegmentState;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

/// Lazy iterator over the chunks of a complete string.
///
/// One chunk is held back so that a whitespace-only remainder at the end of
/// the input can be appended to the last chunk instead of being lost.
///
/// # Examples
///
/// ```
/// use caption_rs::segment::{SegmentConfig, Segments};
///
/// let chunks: Vec<String> = Segments::new("一二三四五六七", SegmentConfig::whole())
///     .map(|c| c.content)
///     .collect();
/// assert_eq!(chunks, vec!["一二三", "四五六", "七"]);
/// ```
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    graphemes: Graphemes<'a>,
    config: SegmentConfig,
    state: SegmentState,
    held: Option<Chunk>,
    done: bool,
}

impl<'a> Segments<'a> {
    /// Creates an iterator over `text`.
    #[must_use]
    pub fn new(text: &'a str, config: SegmentConfig) -> Self {
        Self {
            graphemes: text.graphemes(true),
            config,
            state: SegmentState::default(),
            held: None,
            done: false,
        }
    }

    fn finish(&mut self) -> Option<Chunk> {
        self.done = true;
        if let Some(chunk) = self.state.flush() {
            return self.held.replace(chunk);
        }
        let tail = self.state.take_pending();
        if let Some(last) = self.held.as_mut() {
            last.content.push_str(&tail);
            last.byte_range.end += tail.len();
        }
        None
    }
}

impl Iterator for Segments<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        while !self.done {
            let ready = match self.graphemes.next() {
                Some(grapheme) => self
                    .state
                    .feed(grapheme, &self.config)
                    .and_then(|chunk| self.held.replace(chunk)),
                None => self.finish(),
            };
            if ready.is_some() {
                return ready;
            }
        }
        self.held.take()
    }
}

/// Splits `text` into chunks.
///
/// The chunks concatenate back to `text` whenever `text` contains a
/// non-whitespace character; a blank input yields no chunks.
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn segment(text: &str, config: SegmentConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    Ok(Segments::new(text, config).collect())
}
