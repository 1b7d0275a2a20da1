//! Core domain models for caption-rs.
//!
//! This module contains the plain data structures used throughout the
//! crate: chunks, chat messages, and backend settings. These are pure
//! domain models with no I/O dependencies.

pub mod chunk;
pub mod message;
pub mod settings;

pub use chunk::{Chunk, SplitReason};
pub use message::{Message, Role};
pub use settings::{ApiConfig, ApiMode, COZE_DEFAULT_BASE_URL, Category, ModelType};
