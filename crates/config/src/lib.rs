//! Configuration loading, validation, and management for sunbae.
//!
//! Loads configuration from `~/.sunbae/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Suffix of the per-character assistant environment variables
/// (`SUNNY_ASSISTANT_ID` configures character `sunny`).
pub const ASSISTANT_ENV_SUFFIX: &str = "_ASSISTANT_ID";

/// The root configuration structure.
///
/// Maps directly to `~/.sunbae/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the remote assistant service. Absent = offline mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Calendar year served when a request does not name one
    #[serde(default = "default_year")]
    pub default_year: String,

    /// One-shot completion settings
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Assistant run and polling settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Character id → remote assistant id
    #[serde(default)]
    pub assistants: BTreeMap<String, String>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Dataset file overrides
    #[serde(default)]
    pub datasets: DatasetsConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_year() -> String {
    "2024".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    600
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_year", &self.default_year)
            .field("completion", &self.completion)
            .field("assistant", &self.assistant)
            .field("assistants", &self.assistants)
            .field("gateway", &self.gateway)
            .field("datasets", &self.datasets)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_max_tokens")]
    pub max_completion_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Delay between run status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Polls allowed before a pending run counts as timed out
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Retry a failed run once through the one-shot completion path
    #[serde(default)]
    pub fallback_to_completion: bool,
}

fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_max_poll_attempts() -> u32 {
    60
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_completion_tokens: default_max_tokens(),
            temperature: default_temperature(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            fallback_to_completion: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Optional dataset files replacing the bundled ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.sunbae/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides:
    /// - `SUNBAE_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `SUNBAE_API_URL`
    /// - `<CHARACTER>_ASSISTANT_ID` for each character
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(std::env::vars());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Blank secrets count as absent, matching the environment rules.
    fn normalize(&mut self) {
        if self.api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            self.api_key = None;
        }
        self.assistants.retain(|_, assistant| !assistant.trim().is_empty());
    }

    /// Apply overrides from an environment snapshot.
    ///
    /// Every `<ID>_ASSISTANT_ID` variable is taken as a mapping for character
    /// `<id>`; ids that match no known character are dropped when the chat
    /// pipeline is built.
    pub fn apply_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();

        if let Some(key) = vars
            .get("SUNBAE_API_KEY")
            .or_else(|| vars.get("OPENAI_API_KEY"))
        {
            self.api_key = Some(key.clone());
        }

        if let Some(url) = vars.get("SUNBAE_API_URL") {
            self.api_url = url.clone();
        }

        for (name, value) in &vars {
            if let Some(prefix) = name.strip_suffix(ASSISTANT_ENV_SUFFIX) {
                if !prefix.is_empty() {
                    self.assistants.insert(prefix.to_lowercase(), value.clone());
                }
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sunbae")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, temperature) in [
            ("completion.temperature", self.completion.temperature),
            ("assistant.temperature", self.assistant.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if self.completion.max_tokens == 0 || self.assistant.max_completion_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "token budgets must be at least 1".into(),
            ));
        }

        if self.assistant.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.poll_interval_ms must be at least 1".into(),
            ));
        }

        if self.assistant.max_poll_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.max_poll_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// The remote assistant configured for a character, if any.
    pub fn assistant_for(&self, character_id: &str) -> Option<&str> {
        self.assistants.get(character_id).map(String::as_str)
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            default_year: default_year(),
            completion: CompletionConfig::default(),
            assistant: AssistantConfig::default(),
            assistants: BTreeMap::new(),
            gateway: GatewayConfig::default(),
            datasets: DatasetsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
