//! Re-chunking of generated text for progressive display.
//!
//! Text is scanned one grapheme cluster at a time. A chunk is cut when one
//! of the rules in [`SegmentConfig`] fires:
//!
//! - **Sentence end**: after `。！？.!?`
//! - **Newline**: after a line break
//! - **Clause**: after `，,、`, unless inside Markdown markup or an emoji run
//! - **Length**: once the buffer reaches `min_chars`, with the same exception
//!   unless `force_length` is set (the streaming preset)
//!
//! Two front ends share the same state machine: [`Segments`] / [`segment`]
//! for a complete string and [`StreamSegmenter`] for text arriving in
//! fragments. Whitespace-only buffers are never emitted; they lead the next
//! chunk instead.

pub mod classify;
pub mod config;
pub mod incremental;
mod state;
pub mod whole;

pub use classify::CharClass;
pub use config::{STREAMING_MIN_CHARS, SegmentConfig, WHOLE_MIN_CHARS};
pub use incremental::StreamSegmenter;
pub use whole::{Segments, segment};

/// Resolves a preset by name.
///
/// # Arguments
///
/// * `name` - Preset name: "whole" or "streaming".
///
/// # Errors
///
/// Returns [`crate::error::SegmentError::UnknownMode`] if the name is not recognized.
pub fn create_config(name: &str) -> crate::error::Result<SegmentConfig> {
    match name.to_lowercase().as_str() {
        "whole" => Ok(SegmentConfig::whole()),
        "streaming" => Ok(SegmentConfig::streaming()),
        _ => Err(crate::error::SegmentError::UnknownMode {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Lists available preset names.
#[must_use]
pub fn available_modes() -> Vec<&'static str> {
    vec!["whole", "streaming"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config() {
        assert_eq!(create_config("whole").unwrap(), SegmentConfig::whole());
        assert_eq!(
            create_config("Streaming").unwrap(),
            SegmentConfig::streaming()
        );
        assert!(create_config("semantic").is_err());
    }

    #[test]
    fn test_available_modes() {
        let modes = available_modes();
        assert_eq!(modes.len(), 2);
        for mode in modes {
            assert!(create_config(mode).is_ok());
        }
    }
}
