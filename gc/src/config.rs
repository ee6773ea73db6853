//! GazonCoach configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main GazonCoach configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Data directory and log file locations
    pub storage: StorageConfig,

    /// Admin console configuration
    pub admin: AdminConfig,

    /// Per-user session persistence
    pub session: SessionConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR); CLI flag wins over this
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that the LLM API key environment variable is set. Call this
    /// early for commands that will talk to the provider, to fail fast with
    /// a clear message.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .gazoncoach.yml
        let local_config = PathBuf::from(".gazoncoach.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/gazoncoach/gazoncoach.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gazoncoach").join("gazoncoach.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the configured log level before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Sampling temperature
    pub temperature: f64,
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .context(format!("Environment variable {} not set", self.api_key_env))
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 1024,
            timeout_ms: 60_000,
            temperature: 0.2,
        }
    }
}

/// Data directory and rules file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for JSONL logs, reports and corpus output
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,

    /// Quality-rules markdown document, sent with every request when present
    #[serde(rename = "rules-file")]
    pub rules_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            rules_file: PathBuf::from("data").join("rules.md"),
        }
    }
}

/// Admin console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Environment variable containing the expected admin token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Default number of transcript entries shown by review
    #[serde(rename = "review-limit")]
    pub review_limit: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token_env: "ADMIN_TOKEN".to_string(),
            review_limit: 200,
        }
    }
}

/// Per-user session persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session slot directory; defaults to the user data dir
    pub dir: Option<PathBuf>,
}

impl SessionConfig {
    /// Resolve the session directory
    ///
    /// Uses XDG data directory (~/.local/share/gazoncoach/session on Linux)
    /// unless overridden.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("gazoncoach").join("session"))
                .unwrap_or_else(|| PathBuf::from(".gazoncoach-session"))
        })
    }
}
