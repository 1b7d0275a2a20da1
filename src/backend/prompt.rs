//! System prompt sent with every chat completion.
//!
//! The prompt is a template with a `{category}` placeholder. It is loaded
//! from an external file when one exists, otherwise the compiled-in default
//! is used.

use crate::core::Category;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the category label.
pub const CATEGORY_PLACEHOLDER: &str = "{category}";

/// Default system prompt template.
pub const DEFAULT_SYSTEM_PROMPT: &str = r"你是一个专业的小红书{category}类文案写手。你需要根据用户的主题生成文案。
请使用 Markdown 格式输出，文案要求：
1. 标题使用一级标题 (#)，要吸引人，带有emoji
2. 正文要分段，每段都要有emoji，可以使用加粗和斜体增加文案表现力
3. 最后要有3-5个相关话题标签，使用 `#标签` 的形式
4. 文案风格要活泼、年轻化，但不要过分夸张
5. 内容要真实可信，有价值";

/// Directory name under the user config dir.
const DEFAULT_PROMPT_DIR: &str = "caption-rs/prompts";

/// Filename of the system prompt template.
const SYSTEM_FILENAME: &str = "system.md";

/// Environment variable overriding the prompt directory.
pub const PROMPT_DIR_ENV: &str = "CAPTION_PROMPT_DIR";

/// The system prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PromptTemplate {
    /// Creates a template from text.
    #[must_use]
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Loads the template, falling back to the compiled-in default.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir`)
    /// 2. `CAPTION_PROMPT_DIR` environment variable
    /// 3. `<config dir>/caption-rs/prompts/`
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(PROMPT_DIR_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        resolved_dir
            .map(|dir| dir.join(SYSTEM_FILENAME))
            .and_then(|path| match std::fs::read_to_string(&path) {
                Ok(text) => {
                    tracing::debug!(path = %path.display(), "loaded system prompt");
                    Some(text)
                }
                Err(_) => None,
            })
            .filter(|text| !text.trim().is_empty())
            .map_or_else(Self::defaults, Self::new)
    }

    /// Returns the compiled-in default without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }

    /// Writes the default template to `dir` unless a file already exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_default(dir: &Path) -> std::io::Result<Option<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(SYSTEM_FILENAME);
        if path.exists() {
            return Ok(None);
        }
        std::fs::write(&path, DEFAULT_SYSTEM_PROMPT)?;
        Ok(Some(path))
    }

    /// Returns the default prompt directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(DEFAULT_PROMPT_DIR))
    }

    /// Renders the system prompt for a category.
    #[must_use]
    pub fn render(&self, category: Category) -> String {
        self.system.replace(CATEGORY_PLACEHOLDER, category.label())
    }

    /// The raw template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.system
    }
}

/// Renders the default system prompt for a category.
#[must_use]
pub fn system_prompt(category: Category) -> String {
    PromptTemplate::defaults().render(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_system_prompt_mentions_category() {
        let prompt = system_prompt(Category::Food);
        assert!(prompt.starts_with("你是一个专业的小红书美食类文案写手"));
        assert!(!prompt.contains(CATEGORY_PLACEHOLDER));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SYSTEM_FILENAME), "写{category}文案").unwrap();
        let template = PromptTemplate::load(Some(dir.path()));
        assert_eq!(template.render(Category::Travel), "写旅行文案");
    }

    #[test]
    fn test_load_missing_falls_back() {
        let dir = TempDir::new().unwrap();
        let template = PromptTemplate::load(Some(dir.path()));
        assert_eq!(template, PromptTemplate::defaults());
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let written = PromptTemplate::write_default(dir.path()).unwrap();
        assert!(written.is_some());
        assert!(PromptTemplate::write_default(dir.path()).unwrap().is_none());
        let template = PromptTemplate::load(Some(dir.path()));
        assert_eq!(template.template(), DEFAULT_SYSTEM_PROMPT);
    }
}
