//! Newline-delimited JSON lines of the form `{"content": "..."}`.

use crate::error::StreamError;
use serde::Deserialize;

/// One wire line.
#[derive(Debug, Deserialize)]
struct Line {
    content: Option<serde_json::Value>,
}

/// Encodes one chunk as a wire line, including the trailing newline.
///
/// Blank content is never sent and yields `None`.
///
/// # Examples
///
/// ```
/// use caption_rs::stream::encode_line;
///
/// assert_eq!(encode_line("你好").unwrap(), "{\"content\":\"你好\"}\n");
/// assert!(encode_line("  \n").is_none());
/// ```
#[must_use]
pub fn encode_line(content: &str) -> Option<String> {
    if content.trim().is_empty() {
        return None;
    }
    let mut line = serde_json::json!({ "content": content }).to_string();
    line.push('\n');
    Some(line)
}

/// Decodes one wire line (without its newline).
///
/// Returns `Ok(None)` for lines that carry nothing to display: blank lines,
/// objects without a string `content`, and empty content.
///
/// # Errors
///
/// Returns [`StreamError::MalformedLine`] if the line is not a JSON object.
pub fn decode_line(line: &str) -> Result<Option<String>, StreamError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let parsed: Line = serde_json::from_str(line)?;
    Ok(match parsed.content {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Incremental decoder for a byte stream of wire lines.
///
/// Incomplete lines are buffered until their newline arrives. Lines that
/// fail to decode are logged and skipped; the stream carries on.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    lines: usize,
    skipped: usize,
}

impl NdjsonDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes and returns the contents of every line they completed.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split(|&b| b == b'\n')
            .filter_map(|line| self.decode(line))
            .collect()
    }

    /// Decodes a trailing line that never got its newline.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        self.decode(&line)
    }

    /// Number of non-blank lines seen.
    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    /// Number of malformed lines skipped.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode(&mut self, line: &[u8]) -> Option<String> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        self.lines += 1;

        let text = match std::str::from_utf8(line) {
            Ok(text) => text,
            Err(e) => {
                self.skipped += 1;
                let err = StreamError::InvalidUtf8 {
                    offset: e.valid_up_to(),
                };
                tracing::warn!(line = self.lines, error = %err, "skipping line");
                return None;
            }
        };

        match decode_line(text) {
            Ok(content) => content,
            Err(err) => {
                self.skipped += 1;
                tracing::warn!(line = self.lines, error = %err, "skipping line");
                None
            }
        }
    }
}
