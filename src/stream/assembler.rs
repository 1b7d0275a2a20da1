//! Reassembly of a message from decoded chunks.

/// Concatenates decoded chunk contents in arrival order.
///
/// The assembled message is the target handed to the typing renderer.
#[derive(Debug, Clone, Default)]
pub struct MessageAssembler {
    message: String,
    parts: usize,
}

impl MessageAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk.
    pub fn push(&mut self, content: &str) {
        self.message.push_str(content);
        self.parts += 1;
    }

    /// Appends several chunks.
    pub fn extend<I, S>(&mut self, contents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for content in contents {
            self.push(content.as_ref());
        }
    }

    /// The message so far.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Number of chunks received.
    #[must_use]
    pub const fn parts(&self) -> usize {
        self.parts
    }

    /// Returns `true` if nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
    }

    /// Consumes the assembler and returns the message.
    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}
