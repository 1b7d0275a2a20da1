//! Chat history persisted as one JSON array.

use crate::core::Message;
use crate::error::{Result, StorageError};
use crate::storage::settings::{HISTORY_KEY, StateStore};
use crate::storage::traits::KeyValueStore;

impl<S: KeyValueStore> StateStore<S> {
    /// Loads the chat history, oldest first.
    ///
    /// A malformed stored history is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load_history(&self) -> Result<Vec<Message>> {
        let Some(raw) = self.inner().get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                tracing::warn!(error = %err, "unreadable chat history, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the stored chat history.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save_history(&mut self, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_string(messages).map_err(StorageError::from)?;
        self.inner_mut().set(HISTORY_KEY, &json)
    }

    /// Appends messages to the stored history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn append_history(&mut self, messages: &[Message]) -> Result<Vec<Message>> {
        let mut history = self.load_history()?;
        history.extend_from_slice(messages);
        self.save_history(&history)?;
        Ok(history)
    }

    /// Deletes the stored chat history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_history(&mut self) -> Result<()> {
        self.inner_mut().remove(HISTORY_KEY)
    }
}
