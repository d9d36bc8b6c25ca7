use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::HeadingMode;
use crate::llm::{
    ChatSettings, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

/// User configuration for projdoc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Heading convention requested from the model and used for rendering
    pub mode: HeadingMode,

    /// Chat completion settings
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,

    /// Default output file for generated documents
    pub output_file: PathBuf,

    /// API key; the OPENAI_API_KEY environment variable takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: HeadingMode::Freeform,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            output_file: PathBuf::from("project.docx"),
            api_key: None,
        }
    }
}

impl Config {
    /// Load config from the config directory
    pub fn load() -> Result<Self> {
        match Self::get_config_path() {
            Some(config_path) => Self::load_from(&config_path),
            None => Ok(Config::default()),
        }
    }

    /// Load config from a specific file, falling back to defaults if it is absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to the config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            self.save_to(&config_path)?;
        }

        Ok(())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("projdoc").join("config.toml"))
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "mode = \"markdown\"\nmodel = \"gpt-4o\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mode, HeadingMode::Markdown);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            api_key: Some("sk-test".to_string()),
            temperature: 0.5,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_tokens = \"lots\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
