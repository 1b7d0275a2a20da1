//! Output formatting for CLI commands.
//!
//! Supports text, JSON and NDJSON output formats. NDJSON uses the same
//! `{"content": ...}` lines the generation stream is sent as.

use crate::core::{ApiConfig, ApiMode, Chunk, Message};
use crate::error::Error;
use crate::stream::encode_line;
use serde::Serialize;
use std::fmt::Write;
use unicode_segmentation::UnicodeSegmentation;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON wire lines.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string. Unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }
}

/// Formats segmenter output.
#[must_use]
pub fn format_chunks(chunks: &[Chunk], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_chunks_text(chunks),
        OutputFormat::Json => format_json(&chunks),
        OutputFormat::Ndjson => chunks
            .iter()
            .filter_map(|chunk| encode_line(&chunk.content))
            .collect(),
    }
}

fn format_chunks_text(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return "No chunks.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<6} {:<14} {:<13} Content",
        "Index", "Bytes", "Reason"
    );
    output.push_str(&"-".repeat(60));
    output.push('\n');
    for chunk in chunks {
        let _ = writeln!(
            output,
            "{:<6} {:<14} {:<13} {}",
            chunk.index,
            format!("{}..{}", chunk.start(), chunk.end()),
            chunk.reason,
            chunk.content.escape_debug()
        );
    }
    let _ = writeln!(output, "\n{} chunks", chunks.len());
    output
}

/// Stored settings for one backend, as shown to users.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    mode: ApiMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    base_url: &'a str,
    api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow_id: Option<&'a str>,
}

/// Formats backend settings. The API key is always masked.
#[must_use]
pub fn format_config(mode: ApiMode, config: &ApiConfig, format: OutputFormat) -> String {
    let view = ConfigView {
        mode,
        model: config.model_type.map(|m| m.as_str()),
        base_url: &config.base_url,
        api_key: config.masked_key(),
        workflow_id: config.workflow_id.as_deref(),
    };

    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Mode:         {}", view.mode);
            if let Some(model) = view.model {
                let _ = writeln!(output, "Model:        {model}");
            }
            let _ = writeln!(output, "Base URL:     {}", view.base_url);
            let _ = writeln!(
                output,
                "API key:      {}",
                if view.api_key.is_empty() {
                    "(not set)"
                } else {
                    &view.api_key
                }
            );
            if let Some(id) = view.workflow_id {
                let _ = writeln!(
                    output,
                    "Workflow id:  {}",
                    if id.is_empty() { "(not set)" } else { id }
                );
            }
            output
        }
        OutputFormat::Json => format_json(&view),
        OutputFormat::Ndjson => format_json_line(&view),
    }
}

/// Formats the chat history.
#[must_use]
pub fn format_history(messages: &[Message], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if messages.is_empty() {
                return "No history.\n".to_string();
            }
            let mut output = String::new();
            for message in messages {
                let first_line = message.content.lines().next().unwrap_or_default();
                let _ = writeln!(
                    output,
                    "{:<13} {:<9} {}",
                    message.timestamp,
                    message.role,
                    truncate(first_line, 60)
                );
            }
            output
        }
        OutputFormat::Json => format_json(&messages),
        OutputFormat::Ndjson => messages.iter().map(format_json_line).collect(),
    }
}

/// Caption summary for non-interactive output.
#[derive(Debug, Serialize)]
struct CaptionView<'a> {
    mode: ApiMode,
    content: &'a str,
}

/// Formats a finished caption.
#[must_use]
pub fn format_caption(mode: ApiMode, content: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = content.to_string();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => format_json(&CaptionView { mode, content }),
        OutputFormat::Ndjson => encode_line(content).unwrap_or_default(),
    }
}

/// Error payload for machine-readable output.
#[derive(Debug, Serialize)]
struct ErrorView {
    error: &'static str,
    message: String,
}

/// Formats an error.
///
/// Text output is the error message alone; JSON formats wrap it with a
/// short error kind.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    let kind = match error {
        Error::Segment(_) => "segment",
        Error::Stream(_) => "stream",
        Error::Backend(_) => "backend",
        Error::Storage(_) => "storage",
        Error::Io(_) => "io",
        Error::Command(_) => "command",
        Error::Config { .. } => "config",
    };
    let view = ErrorView {
        error: kind,
        message: error.to_string(),
    };
    match format {
        OutputFormat::Text => view.message,
        OutputFormat::Json => format_json(&view),
        OutputFormat::Ndjson => serde_json::to_string(&view).unwrap_or_else(|_| "{}".to_string()),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

/// Formats a value as one compact JSON line.
fn format_json_line<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}

/// Truncates to `max_len` grapheme clusters with an ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let count = s.graphemes(true).count();
    if count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.graphemes(true).take(max_len).collect()
    } else {
        let head: String = s.graphemes(true).take(max_len - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ModelType, Role, SplitReason};
    use crate::error::BackendError;
    use test_case::test_case;

    #[test_case("text", OutputFormat::Text)]
    #[test_case("JSON", OutputFormat::Json)]
    #[test_case("ndjson", OutputFormat::Ndjson)]
    #[test_case("jsonl", OutputFormat::Ndjson)]
    #[test_case("yaml", OutputFormat::Text)]
    fn test_output_format_parse(input: &str, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("今天吃了好吃的面条", 6), "今天吃...");
        assert_eq!(truncate("👍🏽👍🏽👍🏽👍🏽", 2), "👍🏽👍🏽");
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("# 标题\n".to_string(), 0..9, 0, SplitReason::Newline),
            Chunk::new("正文".to_string(), 9..15, 1, SplitReason::EndOfStream),
        ]
    }

    #[test]
    fn test_format_chunks_text() {
        let text = format_chunks(&chunks(), OutputFormat::Text);
        assert!(text.contains("0..9"));
        assert!(text.contains("# 标题\\n"));
        assert!(text.contains("end_of_stream"));
        assert!(text.contains("2 chunks"));
        assert_eq!(format_chunks(&[], OutputFormat::Text), "No chunks.\n");
    }

    #[test]
    fn test_format_chunks_ndjson_uses_wire_lines() {
        let lines = format_chunks(&chunks(), OutputFormat::Ndjson);
        assert_eq!(
            lines,
            "{\"content\":\"# 标题\\n\"}\n{\"content\":\"正文\"}\n"
        );
    }

    #[test]
    fn test_format_chunks_json() {
        let json = format_chunks(&chunks(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["reason"], "end_of_stream");
        assert_eq!(value[1]["byte_range"]["start"], 9);
    }

    #[test]
    fn test_format_config_masks_key() {
        let config = ApiConfig {
            api_key: "sk-abcdef1234".to_string(),
            ..ApiConfig::default_for(ApiMode::OpenAi, ModelType::Gpt4)
        };
        let text = format_config(ApiMode::OpenAi, &config, OutputFormat::Text);
        assert!(text.contains("gpt-4"));
        assert!(text.contains("*********1234"));
        assert!(!text.contains("sk-abcdef"));

        let json = format_config(ApiMode::OpenAi, &config, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["apiKey"], "*********1234");
        assert!(value.get("workflowId").is_none());
    }

    #[test]
    fn test_format_config_unset_values() {
        let config = ApiConfig::default_for(ApiMode::Coze, ModelType::default());
        let text = format_config(ApiMode::Coze, &config, OutputFormat::Text);
        assert!(text.contains("API key:      (not set)"));
        assert!(text.contains("Workflow id:  (not set)"));
    }

    #[test]
    fn test_format_history() {
        assert_eq!(format_history(&[], OutputFormat::Text), "No history.\n");

        let messages = vec![
            Message {
                role: Role::User,
                content: "露营".to_string(),
                timestamp: 1,
            },
            Message {
                role: Role::Assistant,
                content: "# 露营🏕️\n正文".to_string(),
                timestamp: 2,
            },
        ];
        let text = format_history(&messages, OutputFormat::Text);
        assert!(text.contains("assistant"));
        assert!(text.contains("# 露营🏕️"));
        assert!(!text.contains("正文"));

        let lines = format_history(&messages, OutputFormat::Ndjson);
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn test_format_caption() {
        assert_eq!(
            format_caption(ApiMode::Coze, "好", OutputFormat::Text),
            "好\n"
        );
        assert_eq!(
            format_caption(ApiMode::Coze, "好", OutputFormat::Ndjson),
            "{\"content\":\"好\"}\n"
        );
        let json = format_caption(ApiMode::Coze, "好", OutputFormat::Json);
        assert!(json.contains("\"mode\": \"coze\""));
    }

    #[test]
    fn test_format_error() {
        let err: Error = BackendError::MissingWorkflowId.into();
        assert_eq!(
            format_error(&err, OutputFormat::Text),
            "backend error: missing workflow id"
        );
        let json = format_error(&err, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "backend");
    }
}
