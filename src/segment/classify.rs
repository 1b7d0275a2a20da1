//! Character classes shared by the segmenter and the typing renderer.
//!
//! Classification works on grapheme clusters (`&str`) rather than single
//! `char`s so that emoji built from several code points (ZWJ families,
//! skin-tone modifiers, flags, keycaps) classify as one unit.

use regex::Regex;
use std::sync::OnceLock;

/// Characters that open or close inline Markdown markup.
pub const MARKDOWN_MARKERS: [char; 3] = ['`', '*', '#'];

/// Sentence-terminating punctuation (full-width and ASCII).
pub const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

/// Clause punctuation.
pub const CLAUSE_SEPARATORS: [char; 3] = ['，', ',', '、'];

/// Emoji blocks, regional indicators, the keycap mark, and every
/// extended pictographic code point.
const EMOJI_PATTERN: &str = r"[\x{1F300}-\x{1F9FF}\x{1F1E6}-\x{1F1FF}\x{20E3}]|\p{Extended_Pictographic}";

#[allow(clippy::expect_used)]
fn emoji_regex() -> &'static Regex {
    static EMOJI: OnceLock<Regex> = OnceLock::new();
    EMOJI.get_or_init(|| Regex::new(EMOJI_PATTERN).expect("valid regex"))
}

/// Returns `true` if the grapheme contains an emoji code point.
///
/// # Examples
///
/// ```
/// use caption_rs::segment::classify::is_emoji;
///
/// assert!(is_emoji("🍜"));
/// assert!(is_emoji("👍🏽"));
/// assert!(!is_emoji("面"));
/// assert!(!is_emoji("#"));
/// ```
#[must_use]
pub fn is_emoji(grapheme: &str) -> bool {
    emoji_regex().is_match(grapheme)
}

/// Returns `true` for `` ` ``, `*` and `#`.
#[must_use]
pub fn is_markdown_marker(c: char) -> bool {
    MARKDOWN_MARKERS.contains(&c)
}

/// Returns `true` for `。！？.!?`.
#[must_use]
pub fn is_sentence_end(c: char) -> bool {
    SENTENCE_TERMINATORS.contains(&c)
}

/// Returns `true` for `，,、`.
#[must_use]
pub fn is_clause_separator(c: char) -> bool {
    CLAUSE_SEPARATORS.contains(&c)
}

/// Coarse class of a grapheme cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Emoji or pictograph.
    Emoji,
    /// Markdown marker.
    Markdown,
    /// Sentence-terminating punctuation.
    SentenceEnd,
    /// Clause punctuation.
    ClauseSeparator,
    /// Line break.
    Newline,
    /// Anything else.
    Other,
}

impl CharClass {
    /// Classifies a grapheme cluster.
    ///
    /// Emoji detection wins over the punctuation classes so a keycap such
    /// as `#️⃣` counts as an emoji rather than a heading marker.
    #[must_use]
    pub fn of(grapheme: &str) -> Self {
        let Some(first) = grapheme.chars().next() else {
            return Self::Other;
        };
        if is_emoji(grapheme) {
            Self::Emoji
        } else if is_markdown_marker(first) {
            Self::Markdown
        } else if is_sentence_end(first) {
            Self::SentenceEnd
        } else if is_clause_separator(first) {
            Self::ClauseSeparator
        } else if grapheme.contains('\n') {
            Self::Newline
        } else {
            Self::Other
        }
    }

    /// Returns `true` for classes that are shown without any typing delay.
    #[must_use]
    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Emoji | Self::Markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("🍜", CharClass::Emoji ; "food emoji")]
    #[test_case("👨\u{200D}👩\u{200D}👧", CharClass::Emoji ; "zwj family")]
    #[test_case("🇨🇳", CharClass::Emoji ; "flag")]
    #[test_case("#\u{FE0F}\u{20E3}", CharClass::Emoji ; "keycap")]
    #[test_case("☀\u{FE0F}", CharClass::Emoji ; "sun with variation selector")]
    #[test_case("*", CharClass::Markdown ; "asterisk")]
    #[test_case("`", CharClass::Markdown ; "backtick")]
    #[test_case("#", CharClass::Markdown ; "hash")]
    #[test_case("。", CharClass::SentenceEnd ; "full width period")]
    #[test_case("?", CharClass::SentenceEnd ; "ascii question")]
    #[test_case("，", CharClass::ClauseSeparator ; "full width comma")]
    #[test_case("、", CharClass::ClauseSeparator ; "enumeration comma")]
    #[test_case("\n", CharClass::Newline ; "newline")]
    #[test_case("\r\n", CharClass::Newline ; "crlf")]
    #[test_case("面", CharClass::Other ; "han")]
    #[test_case("a", CharClass::Other ; "latin")]
    #[test_case("", CharClass::Other ; "empty")]
    fn test_char_class(grapheme: &str, expected: CharClass) {
        assert_eq!(CharClass::of(grapheme), expected);
    }

    #[test]
    fn test_instant_classes() {
        assert!(CharClass::Emoji.is_instant());
        assert!(CharClass::Markdown.is_instant());
        assert!(!CharClass::SentenceEnd.is_instant());
        assert!(!CharClass::Other.is_instant());
    }

    #[test]
    fn test_digits_are_not_emoji() {
        // Digits and `#` carry the Unicode Emoji property but are not pictographic.
        assert!(!is_emoji("1"));
        assert!(!is_emoji("#"));
        assert!(!is_emoji("*"));
    }
}
