//! Backend settings persisted in a [`KeyValueStore`].
//!
//! Key layout:
//!
//! | Key              | Value                              |
//! |------------------|------------------------------------|
//! | `api_mode`       | `openai` or `coze`                 |
//! | `last_model`     | model id, e.g. `deepseek-chat`     |
//! | `openai:<model>` | [`ApiConfig`] JSON for that model  |
//! | `coze`           | [`ApiConfig`] JSON for the workflow|

use crate::core::{ApiConfig, ApiMode, ModelType};
use crate::error::{Result, StorageError};
use crate::storage::traits::KeyValueStore;

/// Key holding the selected backend.
pub const API_MODE_KEY: &str = "api_mode";

/// Key holding the last selected model.
pub const LAST_MODEL_KEY: &str = "last_model";

/// Key holding chat history.
pub const HISTORY_KEY: &str = "chat_history";

/// Returns the key under which the configuration for a mode is stored.
///
/// # Examples
///
/// ```
/// use caption_rs::core::{ApiMode, ModelType};
/// use caption_rs::storage::config_key;
///
/// assert_eq!(config_key(ApiMode::OpenAi, ModelType::Gpt4), "openai:gpt-4");
/// assert_eq!(config_key(ApiMode::Coze, ModelType::Gpt4), "coze");
/// ```
#[must_use]
pub fn config_key(mode: ApiMode, model: ModelType) -> String {
    match mode {
        ApiMode::OpenAi => format!("openai:{model}"),
        ApiMode::Coze => "coze".to_string(),
    }
}

/// Typed access to settings and history over any [`KeyValueStore`].
///
/// Unreadable stored values never fail a load: they are logged and the
/// defaults are used instead.
#[derive(Debug)]
pub struct StateStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StateStore<S> {
    /// Wraps a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Returns the underlying store mutably.
    pub const fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the wrapper.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Loads the selected backend, defaulting to OpenAI mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load_mode(&self) -> Result<ApiMode> {
        Ok(self.load_parsed(API_MODE_KEY)?.unwrap_or_default())
    }

    /// Persists the selected backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_mode(&mut self, mode: ApiMode) -> Result<()> {
        self.store.set(API_MODE_KEY, mode.as_str())
    }

    /// Loads the last selected model, defaulting to `deepseek-chat`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn last_model(&self) -> Result<ModelType> {
        Ok(self.load_parsed(LAST_MODEL_KEY)?.unwrap_or_default())
    }

    /// Persists the last selected model.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_last_model(&mut self, model: ModelType) -> Result<()> {
        self.store.set(LAST_MODEL_KEY, model.as_str())
    }

    /// Loads the configuration for a mode (and model, in OpenAI mode).
    ///
    /// Missing or malformed values fall back to
    /// [`ApiConfig::default_for`]; an empty stored base URL is replaced by
    /// the default one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load_api_config(&self, mode: ApiMode, model: ModelType) -> Result<ApiConfig> {
        let key = config_key(mode, model);
        let defaults = ApiConfig::default_for(mode, model);

        let Some(raw) = self.store.get(&key)? else {
            return Ok(defaults);
        };

        match serde_json::from_str::<ApiConfig>(&raw) {
            Ok(mut config) => {
                if config.base_url.trim().is_empty() {
                    config.base_url = defaults.base_url;
                }
                if mode == ApiMode::OpenAi {
                    config.model_type = Some(model);
                }
                Ok(config)
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "unreadable api config, using defaults");
                Ok(defaults)
            }
        }
    }

    /// Persists the configuration for a mode (and model, in OpenAI mode).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save_api_config(
        &mut self,
        mode: ApiMode,
        model: ModelType,
        config: &ApiConfig,
    ) -> Result<()> {
        let mut config = config.clone();
        match mode {
            ApiMode::OpenAi => {
                config.model_type = Some(model);
                config.workflow_id = None;
            }
            ApiMode::Coze => {
                config.model_type = None;
                config.workflow_id.get_or_insert_with(String::new);
            }
        }
        let json = serde_json::to_string(&config).map_err(StorageError::from)?;
        self.store.set(&config_key(mode, model), &json)
    }

    /// Parses a plain-text value, logging and ignoring unknown ones.
    fn load_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr<Err = crate::Error>,
    {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, value = %raw, error = %err, "ignoring stored value");
                Ok(None)
            }
        }
    }
}
