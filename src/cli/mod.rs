//! CLI layer for caption-rs.
//!
//! Provides the command-line interface using clap, with commands for
//! generating captions, segmenting and replaying text, and managing the
//! stored settings and history.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ConfigCommands, HistoryCommands, PromptCommands};
