// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Model used when neither config nor `--model` says otherwise.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Persona both staged and applied at startup.
pub const DEFAULT_PERSONA: &str = "un asistente virtual amigable y muy útil";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API key. The GEMINI_API_KEY / API_KEY env vars take precedence;
    /// whichever value wins is injected into the credential resolver once.
    pub api_key: Option<String>,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub persona: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.into(),
        }
    }
}

impl Config {
    /// Load config from the default path, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// ~/.charla/config.toml
pub fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".charla")
        .join("config.toml")
}
