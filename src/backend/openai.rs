//! OpenAI-compatible chat completions.

use crate::backend::prompt::PromptTemplate;
use crate::backend::{Backend, FragmentStream, GenerateRequest};
use crate::error::{BackendError, Result};
use crate::segment::SegmentConfig;
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures_util::StreamExt;

/// Streams a caption from any OpenAI-compatible endpoint.
#[derive(Debug, Clone, Default)]
pub struct OpenAiBackend {
    prompts: PromptTemplate,
}

impl OpenAiBackend {
    /// Creates a backend with the compiled-in system prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with a custom system prompt.
    #[must_use]
    pub const fn with_prompts(prompts: PromptTemplate) -> Self {
        Self { prompts }
    }

    /// Builds the streaming chat request: system prompt, then the topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the request builder rejects a field.
    pub fn build_request(&self, request: &GenerateRequest) -> Result<CreateChatCompletionRequest> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.prompts.render(request.category))
            .build()
            .map_err(BackendError::from)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(BackendError::from)?;

        Ok(CreateChatCompletionRequestArgs::default()
            .model(request.model.as_str())
            .messages([system.into(), user.into()])
            .stream(true)
            .build()
            .map_err(BackendError::from)?)
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn segment_config(&self) -> SegmentConfig {
        SegmentConfig::streaming()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<FragmentStream> {
        let config = OpenAIConfig::new()
            .with_api_key(request.api_key.as_str())
            .with_api_base(request.base_url.as_str());
        let client = Client::with_config(config);
        let chat = self.build_request(request)?;

        tracing::info!(
            base_url = %request.base_url,
            model = %request.model,
            category = %request.category,
            "starting chat completion stream"
        );

        let stream = client
            .chat()
            .create_stream(chat)
            .await
            .map_err(BackendError::from)?;

        Ok(stream
            .filter_map(|item| async move {
                match item {
                    Ok(response) => response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|content| !content.is_empty())
                        .map(Ok),
                    Err(err) => Some(Err(BackendError::from(err).into())),
                }
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, ModelType};

    #[test]
    fn test_build_request() {
        let backend = OpenAiBackend::new();
        let request = GenerateRequest {
            prompt: "秋天的第一杯奶茶".to_string(),
            category: Category::Food,
            model: ModelType::Gpt4,
            ..GenerateRequest::default()
        };
        let chat = backend.build_request(&request).unwrap();
        assert_eq!(chat.model, "gpt-4");
        assert_eq!(chat.stream, Some(true));
        assert_eq!(chat.messages.len(), 2);

        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(
            json["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("美食")
        );
        assert_eq!(json["messages"][1]["content"], "秋天的第一杯奶茶");
    }

    #[test]
    fn test_custom_prompt() {
        let backend = OpenAiBackend::with_prompts(PromptTemplate::new("只写{category}"));
        let request = GenerateRequest::new("x", Category::Beauty);
        let chat = backend.build_request(&request).unwrap();
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["messages"][0]["content"], "只写美妆");
    }
}
