use crate::core::error::AppError;
use crate::providers::framing::StreamFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub system_prompt_file: Option<String>,
    #[serde(default)]
    pub clipboard_cmd: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub stream_format: StreamFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            host: default_host(),
            system_prompt_file: None,
            clipboard_cmd: None,
            api_key: None,
            stream_format: StreamFormat::default(),
        }
    }
}

/// Values the conversation needs, resolved from the config file and CLI overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub model: String,
    pub system_prompt: String,
    pub api_key: Option<String>,
    pub clipboard_cmd: Option<String>,
    pub stream_format: StreamFormat,
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("prompt-builder")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    pub fn load(path: &Path) -> Result<Config, AppError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AppError::Config(format!(
                    "config file not found: {}\n\n{}",
                    path.display(),
                    SETUP_HINT
                )));
            }
            Err(e) => {
                return Err(AppError::Config(format!("read {}: {}", path.display(), e)));
            }
        };

        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| AppError::Config(format!("parse {}: {}", path.display(), e)))
    }

    /// Applies the model override and reads the system prompt file.
    pub fn resolve(self, model_override: Option<&str>) -> Result<Settings, AppError> {
        let model = model_override
            .map(str::to_string)
            .or(self.model)
            .filter(|m| !m.trim().is_empty())
            .ok_or(AppError::NoModel)?;

        let prompt_file = self.system_prompt_file.ok_or_else(|| {
            AppError::Config("'system_prompt_file' is not set".to_string())
        })?;
        let prompt_path = expand_path(&prompt_file);
        let system_prompt = fs::read_to_string(&prompt_path)
            .map_err(|_| AppError::SystemPrompt(prompt_path.display().to_string()))?;

        Ok(Settings {
            host: self.host,
            model,
            system_prompt,
            api_key: self.api_key,
            clipboard_cmd: self.clipboard_cmd,
            stream_format: self.stream_format,
        })
    }
}

const SETUP_HINT: &str = "Create it with:
  mkdir -p ~/.config/prompt-builder
  cat > ~/.config/prompt-builder/config.yaml << 'EOF'
  model: llama3.2
  host: http://localhost:11434
  system_prompt_file: ~/.config/prompt-builder/prompt-architect.md
  EOF";

/// Expands a leading `~/` against the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
