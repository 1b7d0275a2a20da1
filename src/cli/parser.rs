//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// caption-rs: streaming social-media caption generator.
///
/// Generates captions with an OpenAI-compatible model or a Coze workflow,
/// re-chunks the reply without splitting Markdown or emoji, and types it
/// out with punctuation-aware pauses.
#[derive(Parser, Debug)]
#[command(name = "caption-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings database.
    ///
    /// Defaults to `caption-rs/caption-state.db` in the user data directory.
    #[arg(short, long, env = "CAPTION_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a caption for a topic.
    ///
    /// Settings come from the database; flags override them for this run
    /// and the selected backend and model are remembered.
    #[command(alias = "gen")]
    Generate {
        /// Topic to write about.
        topic: String,

        /// Caption category (生活, 美食, 旅行, 美妆 or life, food, travel, beauty).
        #[arg(short, long, default_value = "生活")]
        category: String,

        /// Backend to use (openai, coze).
        #[arg(short, long)]
        mode: Option<String>,

        /// Chat model (OpenAI mode).
        #[arg(long)]
        model: Option<String>,

        /// API key.
        #[arg(long, env = "CAPTION_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// API base URL.
        #[arg(long, env = "CAPTION_BASE_URL")]
        base_url: Option<String>,

        /// Coze workflow id.
        #[arg(long)]
        workflow_id: Option<String>,

        /// Print the caption at once instead of typing it out.
        #[arg(long)]
        no_typing: bool,

        /// Directory holding a `system.md` prompt template.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Split text into display chunks.
    ///
    /// Reads from FILE, or stdin when omitted.
    Segment {
        /// Input file.
        file: Option<PathBuf>,

        /// Segmentation rules (whole, streaming).
        #[arg(short, long, default_value = "whole")]
        mode: String,
    },

    /// Replay text with the typing effect.
    ///
    /// Reads from FILE, or stdin when omitted.
    Type {
        /// Input file.
        file: Option<PathBuf>,

        /// Type everything at once.
        #[arg(long)]
        instant: bool,
    },

    /// Show or change backend settings.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show or clear chat history.
    #[command(subcommand)]
    History(HistoryCommands),

    /// Show or scaffold the system prompt template.
    #[command(subcommand)]
    Prompt(PromptCommands),
}

/// Settings subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the settings for a backend.
    Show {
        /// Backend (openai, coze); defaults to the selected one.
        #[arg(short, long)]
        mode: Option<String>,

        /// Chat model; defaults to the last used one.
        #[arg(long)]
        model: Option<String>,
    },

    /// Store settings for a backend and select it.
    Set {
        /// Backend (openai, coze); defaults to the selected one.
        #[arg(short, long)]
        mode: Option<String>,

        /// Chat model; defaults to the last used one.
        #[arg(long)]
        model: Option<String>,

        /// API key.
        #[arg(long)]
        api_key: Option<String>,

        /// API base URL (empty resets to the default).
        #[arg(long)]
        base_url: Option<String>,

        /// Coze workflow id.
        #[arg(long)]
        workflow_id: Option<String>,
    },
}

/// History subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List stored messages.
    Show {
        /// Only show the most recent N messages.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete all stored messages.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Prompt template subcommands.
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Print the system prompt rendered for a category.
    Show {
        /// Caption category.
        #[arg(short, long, default_value = "生活")]
        category: String,

        /// Directory holding a `system.md` prompt template.
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },

    /// Write the built-in template to the prompt directory.
    ///
    /// An existing `system.md` is left untouched.
    Init {
        /// Target directory (defaults to the user config directory).
        #[arg(long)]
        prompt_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(crate::storage::default_db_path)
    }
}
