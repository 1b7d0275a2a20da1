//! Grapheme-by-grapheme reveal of a target text.

use crate::render::delay::DelayPolicy;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Text revealed by one [`Typewriter::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    /// Newly displayed text (one grapheme, or a chain of instant ones).
    pub text: String,
    /// Wait before the next tick.
    pub delay: Duration,
}

/// Reveals a target text one grapheme cluster at a time.
///
/// The displayed text is always a prefix of the target. The typewriter has
/// no clock; [`TypingSession`](crate::render::TypingSession) drives it.
///
/// # Examples
///
/// ```
/// use caption_rs::render::{DelayPolicy, Typewriter};
///
/// let mut typewriter = Typewriter::new(DelayPolicy::default());
/// typewriter.set_target("好**的**");
/// assert_eq!(typewriter.tick().unwrap().text, "好**");
/// assert_eq!(typewriter.tick().unwrap().text, "的**");
/// assert!(typewriter.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    policy: DelayPolicy,
    target: String,
    /// Byte length of the displayed prefix of `target`.
    shown: usize,
}

impl Typewriter {
    /// Creates an idle typewriter.
    #[must_use]
    pub const fn new(policy: DelayPolicy) -> Self {
        Self {
            policy,
            target: String::new(),
            shown: 0,
        }
    }

    /// Replaces the target text.
    ///
    /// When the new target extends the displayed text, typing resumes where
    /// it left off. Otherwise the display falls back to the longest common
    /// grapheme prefix of the two.
    pub fn set_target(&mut self, target: &str) {
        let displayed = self.displayed();
        let shown = if target.starts_with(displayed) {
            displayed.len()
        } else {
            common_prefix_len(displayed, target)
        };
        self.target.clear();
        self.target.push_str(target);
        self.shown = shown;
    }

    /// Reveals the next grapheme, chaining any instant ones after it.
    ///
    /// Returns `None` once the whole target is displayed.
    pub fn tick(&mut self) -> Option<Reveal> {
        let rest = &self.target[self.shown..];
        let mut graphemes = rest.graphemes(true).peekable();
        let mut revealed = 0;
        let mut delay = Duration::ZERO;

        while let Some(grapheme) = graphemes.next() {
            revealed += grapheme.len();
            let step = self.policy.step(grapheme, graphemes.peek().copied());
            delay = step.delay;
            if !step.reveal_next {
                break;
            }
        }

        if revealed == 0 {
            return None;
        }
        let text = rest[..revealed].to_string();
        self.shown += revealed;
        Some(Reveal { text, delay })
    }

    /// Text displayed so far.
    #[must_use]
    pub fn displayed(&self) -> &str {
        &self.target[..self.shown]
    }

    /// Text still to be typed.
    #[must_use]
    pub fn remaining(&self) -> &str {
        &self.target[self.shown..]
    }

    /// Current target text.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns `true` once the displayed text equals the target.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shown == self.target.len()
    }

    /// Reveals the rest of the target at once.
    pub fn skip_to_end(&mut self) -> &str {
        let start = self.shown;
        self.shown = self.target.len();
        &self.target[start..]
    }

    /// Returns the delay policy.
    #[must_use]
    pub const fn policy(&self) -> &DelayPolicy {
        &self.policy
    }
}

/// Byte length of the longest common prefix made of whole graphemes.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.graphemes(true)
        .zip(b.graphemes(true))
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len())
        .sum()
}
