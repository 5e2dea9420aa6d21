use crate::core::error::LeetobError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "LEETOB_API_KEY";

fn default_api_key() -> String {
    "sk-public".to_string()
}

fn default_base_url() -> String {
    "https://open.anycorp.dev/v1".to_string()
}

fn default_model_name() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_image_model_name() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_system_instruction() -> String {
    "Ты полезный и умный ассистент.".to_string()
}

fn default_max_history_length() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Separate endpoint for image generation; empty means `base_url`.
    #[serde(default)]
    pub image_base_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_image_model_name")]
    pub image_model_name: String,
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// Exchanges kept per chat; 0 keeps everything.
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,

    /// Where `save` writes. `None` for configs that only live in memory.
    #[serde(skip)]
    path: Option<PathBuf>,
    /// Key taken from the environment. Never written back to the file.
    #[serde(skip)]
    env_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            image_base_url: String::new(),
            model_name: default_model_name(),
            image_model_name: default_image_model_name(),
            system_instruction: default_system_instruction(),
            max_history_length: default_max_history_length(),
            path: None,
            env_api_key: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".leetob")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn history_path() -> PathBuf {
        Self::config_dir().join("history.json")
    }

    /// Load from `path` (or the default location), creating the file with defaults if missing.
    pub fn load(path: Option<&Path>) -> Result<Config, LeetobError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                Config::default()
            } else {
                serde_yml::from_str::<Config>(&contents)
                    .map_err(|e| LeetobError::Config(format!("Parse {}: {}", path.display(), e)))?
            }
        } else {
            info!("Creating default config at {}", path.display());
            let config = Config {
                path: Some(path.clone()),
                ..Config::default()
            };
            if let Err(e) = config.save() {
                warn!("Could not write default config: {}", e);
            }
            config
        };

        config.path = Some(path);

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.env_api_key = Some(key);
            }
        }

        Ok(config)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist to the file this config was loaded from. In-memory configs are left alone.
    pub fn save(&self) -> Result<(), LeetobError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(path, yaml_content)?;
        Ok(())
    }

    /// The key requests are sent with: the environment override, else the configured one.
    pub fn api_key(&self) -> &str {
        self.env_api_key.as_deref().unwrap_or(&self.api_key)
    }

    /// Base URL used for image generation.
    pub fn image_endpoint(&self) -> &str {
        if self.image_base_url.trim().is_empty() {
            &self.base_url
        } else {
            &self.image_base_url
        }
    }
}
