//! Backend selection and API configuration types.
//!
//! These are plain values; persistence lives in [`crate::storage`].

use crate::error::{CommandError, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default base URL for the workflow backend.
pub const COZE_DEFAULT_BASE_URL: &str = "https://api.coze.cn/v1/workflow/run";

/// Which upstream API generates the caption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiMode {
    /// OpenAI-compatible chat completions, streamed.
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Coze workflow run, answered in one piece.
    #[serde(rename = "coze")]
    Coze,
}

impl ApiMode {
    /// Returns the mode identifier used in storage keys and flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Coze => "coze",
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "coze" => Ok(Self::Coze),
            _ => Err(CommandError::InvalidArgument(format!("unknown api mode: {s}")).into()),
        }
    }
}

/// Chat models offered in OpenAI-compatible mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// `gpt-3.5-turbo`
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    /// `gpt-4`
    #[serde(rename = "gpt-4")]
    Gpt4,
    /// `deepseek-chat`
    #[default]
    #[serde(rename = "deepseek-chat")]
    DeepseekChat,
    /// `claude-3`
    #[serde(rename = "claude-3")]
    Claude3,
    /// `moonshot-v1-8k`
    #[serde(rename = "moonshot-v1-8k")]
    MoonshotV18k,
}

impl ModelType {
    /// Every supported model, in display order.
    pub const ALL: [Self; 5] = [
        Self::Gpt35Turbo,
        Self::Gpt4,
        Self::DeepseekChat,
        Self::Claude3,
        Self::MoonshotV18k,
    ];

    /// Returns the model id sent upstream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Gpt4 => "gpt-4",
            Self::DeepseekChat => "deepseek-chat",
            Self::Claude3 => "claude-3",
            Self::MoonshotV18k => "moonshot-v1-8k",
        }
    }

    /// Returns the API base URL the model is served from by default.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Gpt35Turbo | Self::Gpt4 => "https://api.openai.com/v1",
            Self::DeepseekChat => "https://api.deepseek.com/v1",
            Self::Claude3 => "https://api.anthropic.com/v1",
            Self::MoonshotV18k => "https://api.moonshot.cn/v1",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CommandError::InvalidArgument(format!("unknown model: {s}")).into())
    }
}

/// Caption category; steers the system prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// 生活
    #[default]
    #[serde(rename = "生活")]
    Life,
    /// 美食
    #[serde(rename = "美食")]
    Food,
    /// 旅行
    #[serde(rename = "旅行")]
    Travel,
    /// 美妆
    #[serde(rename = "美妆")]
    Beauty,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [Self::Life, Self::Food, Self::Travel, Self::Beauty];

    /// Returns the label shown to users and sent upstream.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Life => "生活",
            Self::Food => "美食",
            Self::Travel => "旅行",
            Self::Beauty => "美妆",
        }
    }

    /// Returns the ASCII alias accepted on the command line.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Life => "life",
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Beauty => "beauty",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s || c.alias().eq_ignore_ascii_case(s))
            .ok_or_else(|| CommandError::InvalidArgument(format!("unknown category: {s}")).into())
    }
}

/// Connection settings for one backend (and model, in OpenAI mode).
///
/// Serialized in camelCase so stored settings stay readable by other
/// front ends sharing the same keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// API base URL.
    #[serde(default)]
    pub base_url: String,

    /// Bearer token.
    #[serde(default)]
    pub api_key: String,

    /// Model, for OpenAI mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,

    /// Workflow id, for Coze mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

impl ApiConfig {
    /// Returns the default configuration for a mode and model.
    #[must_use]
    pub fn default_for(mode: ApiMode, model: ModelType) -> Self {
        match mode {
            ApiMode::OpenAi => Self {
                base_url: model.default_base_url().to_string(),
                model_type: Some(model),
                ..Self::default()
            },
            ApiMode::Coze => Self {
                base_url: COZE_DEFAULT_BASE_URL.to_string(),
                workflow_id: Some(String::new()),
                ..Self::default()
            },
        }
    }

    /// Returns the API key with all but the last four characters masked.
    #[must_use]
    pub fn masked_key(&self) -> String {
        let count = self.api_key.chars().count();
        if count <= 4 {
            return "*".repeat(count);
        }
        let visible: String = self.api_key.chars().skip(count - 4).collect();
        format!("{}{visible}", "*".repeat(count - 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("openai", ApiMode::OpenAi ; "openai lowercase")]
    #[test_case("COZE", ApiMode::Coze ; "coze uppercase")]
    fn test_api_mode_parse(input: &str, expected: ApiMode) {
        assert_eq!(input.parse::<ApiMode>().unwrap(), expected);
    }

    #[test]
    fn test_api_mode_parse_unknown() {
        assert!("gemini".parse::<ApiMode>().is_err());
    }

    #[test_case("生活", Category::Life ; "label life")]
    #[test_case("美食", Category::Food ; "label food")]
    #[test_case("travel", Category::Travel ; "alias travel")]
    #[test_case(" Beauty ", Category::Beauty ; "alias with padding")]
    fn test_category_parse(input: &str, expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn test_model_defaults() {
        assert_eq!(ModelType::default(), ModelType::DeepseekChat);
        assert_eq!(
            ModelType::DeepseekChat.default_base_url(),
            "https://api.deepseek.com/v1"
        );
        assert_eq!(
            "moonshot-v1-8k".parse::<ModelType>().unwrap(),
            ModelType::MoonshotV18k
        );
    }

    #[test]
    fn test_api_config_default_for() {
        let cfg = ApiConfig::default_for(ApiMode::OpenAi, ModelType::Gpt4);
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.model_type, Some(ModelType::Gpt4));

        let cfg = ApiConfig::default_for(ApiMode::Coze, ModelType::Gpt4);
        assert_eq!(cfg.base_url, COZE_DEFAULT_BASE_URL);
        assert!(cfg.model_type.is_none());
    }

    #[test]
    fn test_api_config_camel_case() {
        let cfg = ApiConfig {
            base_url: "https://example.com".to_string(),
            api_key: "sk-1".to_string(),
            model_type: Some(ModelType::DeepseekChat),
            workflow_id: None,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(
            json,
            r#"{"baseUrl":"https://example.com","apiKey":"sk-1","modelType":"deepseek-chat"}"#
        );

        let parsed: ApiConfig = serde_json::from_str(r#"{"apiKey":"k"}"#).unwrap();
        assert_eq!(parsed.api_key, "k");
        assert!(parsed.base_url.is_empty());
    }

    #[test]
    fn test_masked_key() {
        let mut cfg = ApiConfig::default();
        assert_eq!(cfg.masked_key(), "");
        cfg.api_key = "sk-abcdef1234".to_string();
        assert_eq!(cfg.masked_key(), "*********1234");
    }
}
