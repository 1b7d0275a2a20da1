//! Caption generation backends.
//!
//! A [`Backend`] turns a [`GenerateRequest`] into a stream of text
//! fragments. Two backends are available:
//!
//! - **OpenAI-compatible**: streamed chat completions, fragments of a few
//!   tokens each, re-chunked with the streaming rules
//! - **Coze workflow**: one complete reply, re-chunked with the whole-reply
//!   rules
//!
//! [`generate_chunks`] connects a backend to the segmenter and yields
//! display chunks or wire lines.

pub mod coze;
pub mod openai;
pub mod pipeline;
pub mod prompt;

pub use coze::CozeBackend;
pub use openai::OpenAiBackend;
pub use pipeline::{ChunkStream, generate_chunks};
pub use prompt::{PromptTemplate, system_prompt};

use crate::core::{ApiConfig, ApiMode, Category, ModelType};
use crate::error::{BackendError, Result};
use crate::segment::SegmentConfig;
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::path::Path;

/// Stream of generated text fragments.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Everything a backend needs for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Topic entered by the user.
    pub prompt: String,
    /// Caption category.
    pub category: Category,
    /// Backend to call.
    pub mode: ApiMode,
    /// Chat model (OpenAI mode).
    pub model: ModelType,
    /// API base URL.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Workflow id (Coze mode).
    pub workflow_id: Option<String>,
}

impl GenerateRequest {
    /// Creates a request for a topic and category with default settings.
    #[must_use]
    pub fn new(prompt: impl Into<String>, category: Category) -> Self {
        Self {
            prompt: prompt.into(),
            category,
            ..Self::default()
        }
    }

    /// Fills connection settings from a stored configuration.
    ///
    /// An empty base URL falls back to the default for the mode and model.
    #[must_use]
    pub fn with_config(mut self, mode: ApiMode, config: &ApiConfig) -> Self {
        self.mode = mode;
        if let Some(model) = config.model_type {
            self.model = model;
        }
        self.base_url = if config.base_url.trim().is_empty() {
            ApiConfig::default_for(mode, self.model).base_url
        } else {
            config.base_url.clone()
        };
        self.api_key.clone_from(&config.api_key);
        self.workflow_id.clone_from(&config.workflow_id);
        self
    }

    /// Checks that the request can be sent.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingParameter`] when the prompt or API key
    /// is blank, and [`BackendError::MissingWorkflowId`] in workflow mode
    /// without a workflow id.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(BackendError::MissingParameter("prompt".to_string()).into());
        }
        if self.api_key.trim().is_empty() {
            return Err(BackendError::MissingParameter("api key".to_string()).into());
        }
        if self.mode == ApiMode::Coze
            && self
                .workflow_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(BackendError::MissingWorkflowId.into());
        }
        Ok(())
    }
}

/// A source of generated text.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Segmenter rules suited to this backend's fragment sizes.
    fn segment_config(&self) -> SegmentConfig;

    /// Starts a generation and returns its fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream call cannot be started or answers
    /// with a non-success status.
    async fn generate(&self, request: &GenerateRequest) -> Result<FragmentStream>;
}

/// Creates the backend for a mode.
///
/// The OpenAI backend loads its system prompt via [`PromptTemplate::load`].
#[must_use]
pub fn create_backend(mode: ApiMode, prompt_dir: Option<&Path>) -> Box<dyn Backend> {
    match mode {
        ApiMode::OpenAi => Box::new(OpenAiBackend::with_prompts(PromptTemplate::load(
            prompt_dir,
        ))),
        ApiMode::Coze => Box::new(CozeBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: ApiMode) -> GenerateRequest {
        GenerateRequest {
            prompt: "周末去爬山".to_string(),
            api_key: "sk-test".to_string(),
            mode,
            ..GenerateRequest::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(request(ApiMode::OpenAi).validate().is_ok());
        let mut coze = request(ApiMode::Coze);
        coze.workflow_id = Some("7420".to_string());
        assert!(coze.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_prompt_or_key() {
        let mut req = request(ApiMode::OpenAi);
        req.prompt = "  ".to_string();
        assert!(matches!(
            req.validate(),
            Err(crate::Error::Backend(BackendError::MissingParameter(_)))
        ));

        let mut req = request(ApiMode::OpenAi);
        req.api_key.clear();
        assert!(matches!(
            req.validate(),
            Err(crate::Error::Backend(BackendError::MissingParameter(_)))
        ));
    }

    #[test]
    fn test_validate_missing_workflow() {
        let mut req = request(ApiMode::Coze);
        assert!(matches!(
            req.validate(),
            Err(crate::Error::Backend(BackendError::MissingWorkflowId))
        ));
        req.workflow_id = Some(String::new());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_with_config_defaults_base_url() {
        let config = ApiConfig {
            api_key: "k".to_string(),
            model_type: Some(ModelType::MoonshotV18k),
            ..ApiConfig::default()
        };
        let req = GenerateRequest::new("t", Category::Life).with_config(ApiMode::OpenAi, &config);
        assert_eq!(req.model, ModelType::MoonshotV18k);
        assert_eq!(req.base_url, "https://api.moonshot.cn/v1");
        assert_eq!(req.api_key, "k");
    }

    #[test]
    fn test_create_backend() {
        let backend = create_backend(ApiMode::OpenAi, None);
        assert_eq!(backend.name(), "openai");
        assert_eq!(backend.segment_config(), SegmentConfig::streaming());

        let backend = create_backend(ApiMode::Coze, None);
        assert_eq!(backend.name(), "coze");
        assert_eq!(backend.segment_config(), SegmentConfig::whole());
    }
}
