//! The per-grapheme state machine shared by both segmenter variants.

use crate::core::{Chunk, SplitReason};
use crate::segment::classify::CharClass;
use crate::segment::config::SegmentConfig;

/// Accumulation buffer plus the Markdown and emoji flags.
///
/// Fed one grapheme cluster at a time. The flags and the length counter are
/// reset whenever a chunk is cut; byte offsets and indices keep running for
/// the whole stream.
#[derive(Debug, Clone, Default)]
pub(crate) struct SegmentState {
    /// Text accumulated since the last cut.
    buffer: String,
    /// Grapheme clusters in `buffer`.
    len: usize,
    /// Inside an unmatched Markdown delimiter run.
    inside_markdown: bool,
    /// The last grapheme was an emoji.
    inside_emoji: bool,
    /// Marker of the delimiter run the previous grapheme belonged to.
    last_marker: Option<char>,
    /// Stream offset of `buffer`.
    offset: usize,
    /// Index of the next chunk.
    next_index: usize,
}

impl SegmentState {
    /// Appends one grapheme and returns a chunk if a rule fires.
    pub(crate) fn feed(&mut self, grapheme: &str, config: &SegmentConfig) -> Option<Chunk> {
        self.buffer.push_str(grapheme);
        self.len += 1;

        let class = CharClass::of(grapheme);

        // A run such as `**` or ``` toggles once.
        if class == CharClass::Markdown {
            let marker = grapheme.chars().next();
            if self.last_marker != marker {
                self.inside_markdown = !self.inside_markdown;
            }
            self.last_marker = marker;
        } else {
            self.last_marker = None;
        }
        // Headings and inline markup end at a line break.
        if class == CharClass::Newline {
            self.inside_markdown = false;
        }

        // Cleared by the first grapheme after the emoji.
        self.inside_emoji = class == CharClass::Emoji;

        let special = self.inside_markdown || self.inside_emoji;
        let reason = match class {
            CharClass::SentenceEnd if config.split_on_sentence_end => Some(SplitReason::SentenceEnd),
            CharClass::Newline if config.split_on_newline => Some(SplitReason::Newline),
            CharClass::ClauseSeparator if config.split_on_clause && !special => {
                Some(SplitReason::Clause)
            }
            _ => None,
        }
        .or_else(|| {
            // A marker may be followed by more of its run.
            let deferred = !config.force_length && (special || class == CharClass::Markdown);
            (!deferred && self.len >= config.min_chars).then_some(SplitReason::Length)
        });

        reason.and_then(|reason| self.cut(reason))
    }

    /// Emits whatever is buffered, regardless of length.
    ///
    /// Returns `None` when the buffer is blank; the blank text stays buffered.
    pub(crate) fn flush(&mut self) -> Option<Chunk> {
        self.cut(SplitReason::EndOfStream)
    }

    /// Removes and returns the buffered text without emitting it.
    pub(crate) fn take_pending(&mut self) -> String {
        self.len = 0;
        self.offset += self.buffer.len();
        std::mem::take(&mut self.buffer)
    }

    /// Text accumulated since the last cut.
    pub(crate) fn pending(&self) -> &str {
        &self.buffer
    }

    /// Number of chunks emitted so far.
    pub(crate) const fn emitted(&self) -> usize {
        self.next_index
    }

    fn cut(&mut self, reason: SplitReason) -> Option<Chunk> {
        // Blank text is never emitted on its own; it leads the next chunk.
        if self.buffer.trim().is_empty() {
            return None;
        }

        let content = std::mem::take(&mut self.buffer);
        let start = self.offset;
        self.offset += content.len();
        let chunk = Chunk::new(content, start..self.offset, self.next_index, reason);

        tracing::trace!(
            index = chunk.index,
            reason = %reason,
            bytes = chunk.size(),
            "chunk cut"
        );

        self.next_index += 1;
        self.len = 0;
        self.inside_markdown = false;
        self.inside_emoji = false;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_segmentation::UnicodeSegmentation;

    fn feed_all(state: &mut SegmentState, text: &str, config: &SegmentConfig) -> Vec<String> {
        text.graphemes(true)
            .filter_map(|g| state.feed(g, config))
            .map(|c| c.content)
            .collect()
    }

    #[test]
    fn test_length_rule() {
        let mut state = SegmentState::default();
        let cuts = feed_all(&mut state, "abcdefg", &SegmentConfig::whole());
        assert_eq!(cuts, vec!["abc", "def"]);
        assert_eq!(state.pending(), "g");
    }

    #[test]
    fn test_markdown_run_toggles_once() {
        let mut state = SegmentState::default();
        // `**` opens, text stays together until `**` closes.
        let cuts = feed_all(&mut state, "**粗体文字**尾", &SegmentConfig::whole());
        assert_eq!(cuts, vec!["**粗体文字**尾"]);
    }

    #[test]
    fn test_newline_closes_markdown() {
        let mut state = SegmentState::default();
        let cuts = feed_all(&mut state, "# 标\n正文内容", &SegmentConfig::whole());
        assert_eq!(cuts, vec!["# 标\n", "正文内"]);
    }

    #[test]
    fn test_closing_run_not_split() {
        let mut state = SegmentState::default();
        let cuts = feed_all(&mut state, "*强调*文字", &SegmentConfig::whole());
        assert_eq!(cuts, vec!["*强调*文"]);
    }

    #[test]
    fn test_emoji_flag_clears() {
        let mut state = SegmentState::default();
        let config = SegmentConfig::whole();
        assert!(state.feed("的", &config).is_none());
        assert!(state.feed("🍜", &config).is_none());
        assert!(state.feed("🍜", &config).is_none());
        let chunk = state.feed("面", &config).unwrap();
        assert_eq!(chunk.content, "的🍜🍜面");
    }

    #[test]
    fn test_forced_length_ignores_stray_marker() {
        let mut state = SegmentState::default();
        let text = format!("*{}", "一二三四五六七八九十".repeat(3));
        let cuts = feed_all(&mut state, &text, &SegmentConfig::streaming());
        assert_eq!(cuts, vec!["*一二三四五六七八九十", "一二三四五六七八九十一"]);
        assert_eq!(state.pending(), "二三四五六七八九十");

        // Without forcing, the unmatched `*` holds everything back.
        let mut state = SegmentState::default();
        let config = SegmentConfig::streaming().force_length(false);
        assert!(feed_all(&mut state, &text, &config).is_empty());
    }

    #[test]
    fn test_blank_buffer_is_carried() {
        let mut state = SegmentState::default();
        let config = SegmentConfig::streaming();
        let cuts = feed_all(&mut state, "好。\n\n再见", &config);
        assert_eq!(cuts, vec!["好。"]);
        assert_eq!(state.pending(), "\n\n再见");
    }

    #[test]
    fn test_offsets_and_indices() {
        let mut state = SegmentState::default();
        let config = SegmentConfig::whole();
        let chunks: Vec<Chunk> = "一二三四五六"
            .graphemes(true)
            .filter_map(|g| state.feed(g, &config))
            .collect();
        assert_eq!(chunks[0].byte_range, 0..9);
        assert_eq!(chunks[1].byte_range, 9..18);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(state.emitted(), 2);
    }

    #[test]
    fn test_flush_keeps_blank() {
        let mut state = SegmentState::default();
        state.feed(" ", &SegmentConfig::whole());
        assert!(state.flush().is_none());
        assert_eq!(state.take_pending(), " ");
        assert_eq!(state.pending(), "");
    }
}
