//! Wire format between the generator and the display.
//!
//! Each chunk travels as one JSON object per line:
//!
//! ```text
//! {"content":"你好，"}
//! {"content":"世界。"}
//! ```
//!
//! The receiver concatenates the `content` fields in arrival order. Lines
//! that fail to parse are logged and skipped without ending the stream.

pub mod assembler;
pub mod codec;

pub use assembler::MessageAssembler;
pub use codec::{NdjsonDecoder, decode_line, encode_line};
