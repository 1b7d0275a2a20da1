//! # caption-rs
//!
//! Streaming social-media caption generator.
//!
//! caption-rs asks an LLM backend for a short Markdown caption, re-chunks
//! the reply into display units without ever splitting a Markdown marker
//! run or an emoji, sends the chunks as newline-delimited JSON, and types
//! the assembled message out with punctuation-aware pauses.
//!
//! ## Features
//!
//! - **Segmentation**: whole-string and incremental front ends over one
//!   grapheme-aware state machine
//! - **Typing renderer**: cancellable, generation-tagged reveal timers with
//!   an injectable scheduler
//! - **Backends**: OpenAI-compatible streaming chat and Coze workflows
//! - **`SQLite` Storage**: settings and chat history in a key-value table
//!
//! ## Example
//!
//! ```
//! use caption_rs::segment::{SegmentConfig, segment};
//!
//! let chunks = segment("今天吃了好吃的🍜面条，很满足！", SegmentConfig::whole()).unwrap();
//! let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
//! assert_eq!(joined, "今天吃了好吃的🍜面条，很满足！");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod segment;
pub mod storage;
pub mod stream;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{ApiConfig, ApiMode, Category, Chunk, Message, ModelType, Role, SplitReason};

// Re-export segmentation types
pub use segment::{SegmentConfig, StreamSegmenter, available_modes, create_config, segment};

// Re-export rendering types
pub use render::{DelayPolicy, Scheduler, TaskHandle, TypingSession, Typewriter};

// Re-export wire format types
pub use stream::{MessageAssembler, NdjsonDecoder, decode_line, encode_line};

// Re-export backend types
pub use backend::{Backend, ChunkStream, GenerateRequest, create_backend, generate_chunks};

// Re-export storage types
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StateStore};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
