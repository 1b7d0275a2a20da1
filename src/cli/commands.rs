//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::backend::{
    Backend, ChunkStream, GenerateRequest, PromptTemplate, create_backend, generate_chunks,
};
use crate::cli::output::{
    OutputFormat, format_caption, format_chunks, format_config, format_history,
};
use crate::cli::parser::{Cli, Commands, ConfigCommands, HistoryCommands, PromptCommands};
use crate::core::{ApiMode, Category, Message, ModelType};
use crate::error::{CommandError, Error, IoError, Result};
use crate::render::{DelayPolicy, render_stream, type_text};
use crate::segment::{create_config, segment};
use crate::storage::{KeyValueStore, SqliteStore, StateStore};
use crate::stream::{MessageAssembler, encode_line};
use std::io::{self, Read, Write};
use std::path::Path;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. Commands that type to the
/// terminal write while they run and return only a trailing newline.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Generate {
            topic,
            category,
            mode,
            model,
            api_key,
            base_url,
            workflow_id,
            no_typing,
            prompt_dir,
        } => cmd_generate(
            &db_path,
            &GenerateOptions {
                topic,
                category,
                mode: mode.as_deref(),
                model: model.as_deref(),
                api_key: api_key.as_deref(),
                base_url: base_url.as_deref(),
                workflow_id: workflow_id.as_deref(),
                no_typing: *no_typing,
                prompt_dir: prompt_dir.as_deref(),
            },
            format,
        ),
        Commands::Segment { file, mode } => cmd_segment(file.as_deref(), mode, format),
        Commands::Type { file, instant } => cmd_type(file.as_deref(), *instant),
        Commands::Config(ConfigCommands::Show { mode, model }) => {
            cmd_config_show(&db_path, mode.as_deref(), model.as_deref(), format)
        }
        Commands::Config(ConfigCommands::Set {
            mode,
            model,
            api_key,
            base_url,
            workflow_id,
        }) => cmd_config_set(
            &db_path,
            &ConfigUpdate {
                mode: mode.as_deref(),
                model: model.as_deref(),
                api_key: api_key.as_deref(),
                base_url: base_url.as_deref(),
                workflow_id: workflow_id.as_deref(),
            },
            format,
        ),
        Commands::History(HistoryCommands::Show { limit }) => {
            cmd_history_show(&db_path, *limit, format)
        }
        Commands::History(HistoryCommands::Clear { yes }) => cmd_history_clear(&db_path, *yes),
        Commands::Prompt(PromptCommands::Show {
            category,
            prompt_dir,
        }) => cmd_prompt_show(category, prompt_dir.as_deref()),
        Commands::Prompt(PromptCommands::Init { prompt_dir }) => {
            cmd_prompt_init(prompt_dir.as_deref())
        }
    }
}

/// Flags of the `generate` command.
#[derive(Debug, Default)]
struct GenerateOptions<'a> {
    topic: &'a str,
    category: &'a str,
    mode: Option<&'a str>,
    model: Option<&'a str>,
    api_key: Option<&'a str>,
    base_url: Option<&'a str>,
    workflow_id: Option<&'a str>,
    no_typing: bool,
    prompt_dir: Option<&'a Path>,
}

/// Flags of the `config set` command.
#[derive(Debug, Default)]
struct ConfigUpdate<'a> {
    mode: Option<&'a str>,
    model: Option<&'a str>,
    api_key: Option<&'a str>,
    base_url: Option<&'a str>,
    workflow_id: Option<&'a str>,
}

fn open_state(db_path: &Path) -> Result<StateStore<SqliteStore>> {
    Ok(StateStore::new(SqliteStore::open(db_path)?))
}

/// Resolves the backend and model from flags, falling back to stored choices.
fn resolve_selection(
    state: &StateStore<SqliteStore>,
    mode: Option<&str>,
    model: Option<&str>,
) -> Result<(ApiMode, ModelType)> {
    let mode = match mode {
        Some(name) => name.parse()?,
        None => state.load_mode()?,
    };
    let model = match model {
        Some(name) => name.parse()?,
        None => state.last_model()?,
    };
    Ok((mode, model))
}

/// Reads a file, or stdin when no path is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            let display = path.to_string_lossy().to_string();
            if !path.exists() {
                return Err(IoError::FileNotFound { path: display }.into());
            }
            std::fs::read_to_string(path).map_err(|e| {
                IoError::ReadFailed {
                    path: display,
                    reason: e.to_string(),
                }
                .into()
            })
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| IoError::ReadFailed {
                    path: "-".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(content)
        }
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            CommandError::ExecutionFailed(format!("failed to start async runtime: {e}")).into()
        })
}

/// Checks a user-supplied base URL. Empty means "use the default".
fn check_base_url(url: &str) -> Result<()> {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config {
            message: format!("base URL must start with http:// or https://: {url}"),
        })
    }
}

/// Newline that ends terminal output, unless the text already has one.
fn closing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        String::new()
    } else {
        "\n".to_string()
    }
}

// ==================== Command Implementations ====================

fn cmd_generate(db_path: &Path, opts: &GenerateOptions<'_>, format: OutputFormat) -> Result<String> {
    let category: Category = opts.category.parse()?;
    let mut state = open_state(db_path)?;
    let (mode, model) = resolve_selection(&state, opts.mode, opts.model)?;

    let mut config = state.load_api_config(mode, model)?;
    if let Some(key) = opts.api_key {
        config.api_key = key.to_string();
    }
    if let Some(url) = opts.base_url {
        check_base_url(url)?;
        config.base_url = url.to_string();
    }
    if let Some(id) = opts.workflow_id {
        config.workflow_id = Some(id.to_string());
    }

    let request = GenerateRequest::new(opts.topic, category).with_config(mode, &config);
    request.validate()?;

    state.save_mode(mode)?;
    if mode == ApiMode::OpenAi {
        state.save_last_model(model)?;
    }
    state.append_history(&[Message::user(opts.topic)])?;

    let backend = create_backend(mode, opts.prompt_dir);
    let runtime = build_runtime()?;
    runtime.block_on(generate_caption(
        &mut state,
        backend.as_ref(),
        &request,
        format,
        opts.no_typing,
    ))
}

/// Streams one caption and records it in the history.
///
/// Text that arrived before a backend failure is recorded too; the failure
/// is returned afterwards.
async fn generate_caption<S: KeyValueStore>(
    state: &mut StateStore<S>,
    backend: &dyn Backend,
    request: &GenerateRequest,
    format: OutputFormat,
    no_typing: bool,
) -> Result<String> {
    let stream = generate_chunks(backend, request).await?;
    let caption = deliver_caption(stream, request.mode, format, no_typing).await?;

    if caption.message.trim().is_empty() {
        tracing::warn!(mode = %request.mode, "backend produced no caption");
    } else {
        state.append_history(&[Message::assistant(caption.message)])?;
    }
    match caption.failure {
        Some(err) => Err(err),
        None => Ok(caption.output),
    }
}

/// A delivered caption.
#[derive(Debug)]
struct Caption {
    /// Text received from the backend, complete or not.
    message: String,
    /// Output left to print.
    output: String,
    /// Error that ended the stream early.
    failure: Option<Error>,
}

/// Writes a generated caption in the requested format.
async fn deliver_caption(
    mut stream: ChunkStream,
    mode: ApiMode,
    format: OutputFormat,
    no_typing: bool,
) -> Result<Caption> {
    match format {
        OutputFormat::Ndjson => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let mut assembler = MessageAssembler::new();
            let mut failure = None;
            while let Some(chunk) = stream.next_chunk().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                };
                if let Some(line) = encode_line(&chunk.content) {
                    out.write_all(line.as_bytes())?;
                    out.flush()?;
                }
                assembler.push(&chunk.content);
            }
            Ok(Caption {
                message: assembler.into_message(),
                output: String::new(),
                failure,
            })
        }
        OutputFormat::Text if !no_typing => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let typed = render_stream(&mut stream, DelayPolicy::default(), &mut out).await?;
            let output = closing_newline(&typed.message);
            Ok(Caption {
                message: typed.message,
                output,
                failure: typed.failure,
            })
        }
        _ => {
            let (chunks, failure) = stream.collect_partial().await;
            let message: String = chunks.into_iter().map(|chunk| chunk.content).collect();
            let output = format_caption(mode, &message, format);
            Ok(Caption {
                message,
                output,
                failure,
            })
        }
    }
}

fn cmd_segment(file: Option<&Path>, mode: &str, format: OutputFormat) -> Result<String> {
    let config = create_config(mode)?;
    let text = read_input(file)?;
    let chunks = segment(&text, config)?;
    tracing::debug!(mode, chunks = chunks.len(), "segmented input");
    Ok(format_chunks(&chunks, format))
}

fn cmd_type(file: Option<&Path>, instant: bool) -> Result<String> {
    let text = read_input(file)?;
    let policy = if instant {
        DelayPolicy::instant()
    } else {
        DelayPolicy::default()
    };

    let runtime = build_runtime()?;
    let stdout = io::stdout();
    runtime.block_on(async {
        let mut out = stdout.lock();
        type_text(&text, policy, &mut out).await
    })?;
    Ok(closing_newline(&text))
}

fn cmd_config_show(
    db_path: &Path,
    mode: Option<&str>,
    model: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let state = open_state(db_path)?;
    let (mode, model) = resolve_selection(&state, mode, model)?;
    let config = state.load_api_config(mode, model)?;
    Ok(format_config(mode, &config, format))
}

fn cmd_config_set(db_path: &Path, update: &ConfigUpdate<'_>, format: OutputFormat) -> Result<String> {
    let mut state = open_state(db_path)?;
    let (mode, model) = resolve_selection(&state, update.mode, update.model)?;

    let mut config = state.load_api_config(mode, model)?;
    if let Some(key) = update.api_key {
        config.api_key = key.to_string();
    }
    if let Some(url) = update.base_url {
        check_base_url(url)?;
        config.base_url = url.to_string();
    }
    if let Some(id) = update.workflow_id {
        if mode != ApiMode::Coze {
            return Err(CommandError::InvalidArgument(
                "--workflow-id only applies to coze mode".to_string(),
            )
            .into());
        }
        config.workflow_id = Some(id.to_string());
    }

    state.save_api_config(mode, model, &config)?;
    state.save_mode(mode)?;
    if mode == ApiMode::OpenAi {
        state.save_last_model(model)?;
    }

    // Reload so an emptied base URL shows its default.
    let saved = state.load_api_config(mode, model)?;
    Ok(match format {
        OutputFormat::Text => format!("Saved {mode} settings.\n{}", format_config(mode, &saved, format)),
        _ => format_config(mode, &saved, format),
    })
}

fn cmd_history_show(db_path: &Path, limit: Option<usize>, format: OutputFormat) -> Result<String> {
    let state = open_state(db_path)?;
    let history = state.load_history()?;
    let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
    Ok(format_history(&history[skip..], format))
}

fn cmd_history_clear(db_path: &Path, yes: bool) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm. This deletes all stored messages.".to_string(),
        )
        .into());
    }

    let mut state = open_state(db_path)?;
    state.clear_history()?;
    Ok("History cleared.\n".to_string())
}

fn cmd_prompt_show(category: &str, prompt_dir: Option<&Path>) -> Result<String> {
    let category: Category = category.parse()?;
    let mut prompt = PromptTemplate::load(prompt_dir).render(category);
    prompt.push_str(&closing_newline(&prompt));
    Ok(prompt)
}

fn cmd_prompt_init(prompt_dir: Option<&Path>) -> Result<String> {
    let dir = prompt_dir
        .map(Path::to_path_buf)
        .or_else(PromptTemplate::default_dir)
        .ok_or_else(|| {
            CommandError::MissingArgument("--prompt-dir (no config directory found)".to_string())
        })?;

    match PromptTemplate::write_default(&dir)? {
        Some(path) => Ok(format!("Wrote prompt template to {}\n", path.display())),
        None => Ok(format!(
            "Prompt template already exists in {}\n",
            dir.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FragmentStream;
    use crate::core::Role;
    use crate::error::BackendError;
    use crate::segment::SegmentConfig;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use futures_util::{StreamExt, stream};
    use tempfile::TempDir;

    /// Sends one fragment, then fails.
    struct FailingBackend;

    #[async_trait]
    impl Backend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn segment_config(&self) -> SegmentConfig {
            SegmentConfig::streaming()
        }

        async fn generate(&self, _request: &GenerateRequest) -> Result<FragmentStream> {
            let items: Vec<Result<String>> = vec![
                Ok("已经生成的半句话。".to_string()),
                Err(BackendError::Request("connection reset".to_string()).into()),
            ];
            Ok(stream::iter(items).boxed())
        }
    }

    fn openai_request() -> GenerateRequest {
        GenerateRequest {
            api_key: "sk".to_string(),
            ..GenerateRequest::new("主题", Category::Life)
        }
    }

    fn setup() -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("state.db");
        (temp_dir, db_path)
    }

    #[test]
    fn test_config_set_and_show() {
        let (_temp_dir, db_path) = setup();

        let update = ConfigUpdate {
            model: Some("gpt-4"),
            api_key: Some("sk-abcdef1234"),
            ..ConfigUpdate::default()
        };
        let output = cmd_config_set(&db_path, &update, OutputFormat::Text).unwrap();
        assert!(output.starts_with("Saved openai settings."));

        let shown = cmd_config_show(&db_path, None, None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value["mode"], "openai");
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["baseUrl"], "https://api.openai.com/v1");
        assert_eq!(value["apiKey"], "*********1234");
    }

    #[test]
    fn test_config_set_empty_base_url_resets() {
        let (_temp_dir, db_path) = setup();
        let custom = ConfigUpdate {
            mode: Some("coze"),
            base_url: Some("https://proxy.example.com/run"),
            workflow_id: Some("742"),
            ..ConfigUpdate::default()
        };
        cmd_config_set(&db_path, &custom, OutputFormat::Text).unwrap();

        let reset = ConfigUpdate {
            mode: Some("coze"),
            base_url: Some(""),
            ..ConfigUpdate::default()
        };
        let output = cmd_config_set(&db_path, &reset, OutputFormat::Text).unwrap();
        assert!(output.contains(crate::core::COZE_DEFAULT_BASE_URL));
        assert!(output.contains("742"));
    }

    #[test]
    fn test_config_set_rejects_workflow_id_for_openai() {
        let (_temp_dir, db_path) = setup();
        let update = ConfigUpdate {
            mode: Some("openai"),
            workflow_id: Some("742"),
            ..ConfigUpdate::default()
        };
        let result = cmd_config_set(&db_path, &update, OutputFormat::Text);
        assert!(matches!(
            result,
            Err(Error::Command(CommandError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn test_config_set_rejects_bad_base_url() {
        let (_temp_dir, db_path) = setup();
        let update = ConfigUpdate {
            base_url: Some("api.example.com/v1"),
            ..ConfigUpdate::default()
        };
        let result = cmd_config_set(&db_path, &update, OutputFormat::Text);
        assert!(matches!(result, Err(Error::Config { .. })));

        // Nothing was saved; the default model keeps its default URL.
        let shown = cmd_config_show(&db_path, None, None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value["model"], "deepseek-chat");
        assert_eq!(value["baseUrl"], "https://api.deepseek.com/v1");
    }

    #[test]
    fn test_config_show_unknown_mode() {
        let (_temp_dir, db_path) = setup();
        let result = cmd_config_show(&db_path, Some("gemini"), None, OutputFormat::Text);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_show_and_clear() {
        let (_temp_dir, db_path) = setup();
        assert_eq!(
            cmd_history_show(&db_path, None, OutputFormat::Text).unwrap(),
            "No history.\n"
        );

        {
            let mut state = open_state(&db_path).unwrap();
            state
                .save_history(&[
                    Message::user("一"),
                    Message::assistant("二"),
                    Message::user("三"),
                ])
                .unwrap();
        }

        let json = cmd_history_show(&db_path, Some(2), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["content"], "二");

        assert!(cmd_history_clear(&db_path, false).is_err());
        cmd_history_clear(&db_path, true).unwrap();
        assert_eq!(
            cmd_history_show(&db_path, None, OutputFormat::Text).unwrap(),
            "No history.\n"
        );
    }

    #[test]
    fn test_generate_requires_api_key() {
        let (_temp_dir, db_path) = setup();
        let opts = GenerateOptions {
            topic: "周末露营",
            category: "travel",
            ..GenerateOptions::default()
        };
        let result = cmd_generate(&db_path, &opts, OutputFormat::Text);
        assert!(matches!(
            result,
            Err(Error::Backend(BackendError::MissingParameter(_)))
        ));

        // Nothing is recorded for a request that was never sent.
        let state = open_state(&db_path).unwrap();
        assert!(state.load_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_caption_is_recorded_on_failure() {
        let mut state = StateStore::new(MemoryStore::new());
        let result = generate_caption(
            &mut state,
            &FailingBackend,
            &openai_request(),
            OutputFormat::Json,
            true,
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Backend(BackendError::Request(_)))
        ));

        let history = state.load_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::Assistant);
        assert_eq!(history[0].content, "已经生成的半句话。");
    }

    #[test]
    fn test_generate_coze_requires_workflow_id() {
        let (_temp_dir, db_path) = setup();
        let opts = GenerateOptions {
            topic: "火锅",
            category: "美食",
            mode: Some("coze"),
            api_key: Some("pat"),
            ..GenerateOptions::default()
        };
        let result = cmd_generate(&db_path, &opts, OutputFormat::Text);
        assert!(matches!(
            result,
            Err(Error::Backend(BackendError::MissingWorkflowId))
        ));
    }

    #[test]
    fn test_generate_rejects_unknown_category() {
        let (_temp_dir, db_path) = setup();
        let opts = GenerateOptions {
            topic: "猫",
            category: "pets",
            api_key: Some("sk"),
            ..GenerateOptions::default()
        };
        assert!(cmd_generate(&db_path, &opts, OutputFormat::Text).is_err());
    }

    #[test]
    fn test_segment_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("caption.md");
        std::fs::write(&path, "今天吃了好吃的🍜面条，很满足！").unwrap();

        let output = cmd_segment(Some(&path), "whole", OutputFormat::Ndjson).unwrap();
        let joined: String = output
            .lines()
            .map(|line| crate::stream::decode_line(line).unwrap().unwrap())
            .collect();
        assert_eq!(joined, "今天吃了好吃的🍜面条，很满足！");
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_segment_unknown_mode() {
        let result = cmd_segment(None, "paragraph", OutputFormat::Text);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_input_missing_file() {
        let result = read_input(Some(Path::new("/nonexistent/caption.md")));
        assert!(matches!(
            result,
            Err(Error::Io(IoError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_prompt_init_then_show() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("prompts");

        let output = cmd_prompt_init(Some(&dir)).unwrap();
        assert!(output.starts_with("Wrote prompt template"));
        let output = cmd_prompt_init(Some(&dir)).unwrap();
        assert!(output.starts_with("Prompt template already exists"));

        std::fs::write(dir.join("system.md"), "写一篇{category}文案").unwrap();
        assert_eq!(
            cmd_prompt_show("food", Some(&dir)).unwrap(),
            "写一篇美食文案\n"
        );
    }

    #[test]
    fn test_closing_newline() {
        assert_eq!(closing_newline(""), "");
        assert_eq!(closing_newline("好\n"), "");
        assert_eq!(closing_newline("好"), "\n");
    }
}
