//! Key-value store trait.
//!
//! Settings and chat history are kept as string values under fixed keys,
//! the way a browser front end would use local storage. Any store that can
//! get, set and remove strings can back [`StateStore`](super::StateStore).

use crate::error::Result;

/// A string-to-string store.
pub trait KeyValueStore: Send {
    /// Reads a value.
    ///
    /// Returns `None` if the key is not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Lists all keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn keys(&self) -> Result<Vec<String>>;
}
