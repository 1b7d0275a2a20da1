//! Typing animation.
//!
//! The reveal is split into three layers:
//!
//! - [`DelayPolicy`]: how long to pause after each grapheme
//! - [`Typewriter`]: which text to reveal next, given the target
//! - [`TypingSession`]: when to reveal it, through a [`Scheduler`]
//!
//! Emoji and Markdown markers appear instantly. Sentence punctuation pauses
//! for 300 ms, clause punctuation for 150 ms, everything else for 30 ms.

pub mod delay;
pub mod driver;
pub mod scheduler;
pub mod session;
pub mod typewriter;

pub use delay::{DelayPolicy, Step};
pub use driver::{TypedCaption, render_stream, type_text};
pub use scheduler::{ManualScheduler, Scheduler, TaskHandle, TokioScheduler};
pub use session::TypingSession;
pub use typewriter::{Reveal, Typewriter};
