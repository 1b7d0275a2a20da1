//! Per-character typing delays.

use crate::segment::classify::CharClass;
use std::time::Duration;

/// Pause after ordinary characters.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(30);

/// Pause after `，,、`.
pub const DEFAULT_CLAUSE_DELAY: Duration = Duration::from_millis(150);

/// Pause after `。！？.!?`.
pub const DEFAULT_SENTENCE_DELAY: Duration = Duration::from_millis(300);

/// Outcome of the delay policy for one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Wait before revealing the following character.
    pub delay: Duration,
    /// Reveal the following character together with this one.
    pub reveal_next: bool,
}

/// Maps a character (and the one after it) to a typing delay.
///
/// Emoji and Markdown markers appear instantly; when the next character is
/// also one of them it is revealed in the same step, so a run such as `**`
/// or `🎉🎉` pops in at once.
///
/// # Examples
///
/// ```
/// use caption_rs::render::DelayPolicy;
/// use std::time::Duration;
///
/// let policy = DelayPolicy::default();
/// assert_eq!(policy.step("。", Some("下")).delay, Duration::from_millis(300));
/// assert!(policy.step("*", Some("*")).reveal_next);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    base: Duration,
    clause: Duration,
    sentence: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_DELAY,
            DEFAULT_CLAUSE_DELAY,
            DEFAULT_SENTENCE_DELAY,
        )
    }
}

impl DelayPolicy {
    /// Creates a policy with custom delays.
    #[must_use]
    pub const fn new(base: Duration, clause: Duration, sentence: Duration) -> Self {
        Self {
            base,
            clause,
            sentence,
        }
    }

    /// A policy with every delay set to zero.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Returns the delay after `current` given the grapheme that follows it.
    #[must_use]
    pub fn step(&self, current: &str, next: Option<&str>) -> Step {
        let delay = match CharClass::of(current) {
            CharClass::Emoji | CharClass::Markdown => Duration::ZERO,
            CharClass::SentenceEnd => self.sentence,
            CharClass::ClauseSeparator => self.clause,
            CharClass::Newline | CharClass::Other => self.base,
        };
        let reveal_next = next.is_some_and(|n| CharClass::of(n).is_instant());
        Step { delay, reveal_next }
    }

    /// Sum of the delays needed to type `text` from scratch.
    #[must_use]
    pub fn total(&self, text: &str) -> Duration {
        use unicode_segmentation::UnicodeSegmentation;

        let graphemes: Vec<&str> = text.graphemes(true).collect();
        let mut total = Duration::ZERO;
        let mut i = 0;
        while i < graphemes.len() {
            // Chained instant characters share one step.
            let mut step = self.step(graphemes[i], graphemes.get(i + 1).copied());
            while step.reveal_next {
                i += 1;
                step = self.step(graphemes[i], graphemes.get(i + 1).copied());
            }
            total += step.delay;
            i += 1;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a", None, 30 ; "latin")]
    #[test_case("面", Some("条"), 30 ; "han")]
    #[test_case("\n", None, 30 ; "newline")]
    #[test_case("。", None, 300 ; "full width period")]
    #[test_case("!", None, 300 ; "ascii bang")]
    #[test_case("？", None, 300 ; "full width question")]
    #[test_case("，", None, 150 ; "full width comma")]
    #[test_case("、", None, 150 ; "enumeration comma")]
    #[test_case("🍜", None, 0 ; "emoji")]
    #[test_case("#", None, 0 ; "heading marker")]
    #[test_case("`", None, 0 ; "backtick")]
    fn test_delay(current: &str, next: Option<&str>, millis: u64) {
        let step = DelayPolicy::default().step(current, next);
        assert_eq!(step.delay, Duration::from_millis(millis));
    }

    #[test_case("*", Some("*"), true ; "marker run")]
    #[test_case("🎉", Some("🎉"), true ; "emoji run")]
    #[test_case("🎉", Some("好"), false ; "emoji then text")]
    #[test_case("好", Some("🎉"), true ; "text then emoji")]
    #[test_case("*", None, false ; "last character")]
    fn test_reveal_next(current: &str, next: Option<&str>, expected: bool) {
        assert_eq!(
            DelayPolicy::default().step(current, next).reveal_next,
            expected
        );
    }

    #[test]
    fn test_custom_policy() {
        let policy = DelayPolicy::new(
            Duration::from_millis(1),
            Duration::from_millis(2),
            Duration::from_millis(3),
        );
        assert_eq!(policy.step("x", None).delay, Duration::from_millis(1));
        assert_eq!(policy.step(",", None).delay, Duration::from_millis(2));
        assert_eq!(policy.step(".", None).delay, Duration::from_millis(3));
        assert_eq!(
            DelayPolicy::instant().step(".", None).delay,
            Duration::ZERO
        );
    }

    #[test]
    fn test_total() {
        let policy = DelayPolicy::default();
        // 30 + 150 + 30 + 300
        assert_eq!(policy.total("好，的。"), Duration::from_millis(510));
        // `**` shares one step with the `好` before it.
        assert_eq!(policy.total("好**"), Duration::ZERO);
    }
}
