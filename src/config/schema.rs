use crate::error::{PullError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default mirror for the `@vladmandic/human-models` package
pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/@vladmandic/human-models/models/";

/// Mirrors exposing the same package contents, tried after the default one
pub const DEFAULT_FALLBACKS: &[&str] = &[
    "https://fastly.jsdelivr.net/npm/@vladmandic/human-models/models/",
    "https://unpkg.com/@vladmandic/human-models@latest/models/",
    "https://raw.githubusercontent.com/vladmandic/human-models/main/models/",
];

/// Main configuration structure
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct MirrorConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Per-request timeout; unset keeps the HTTP client's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct DownloadConfig {
    #[serde(default = "default_dest")]
    pub dest: PathBuf,
}

// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_fallbacks() -> Vec<String> {
    DEFAULT_FALLBACKS.iter().map(ToString::to_string).collect()
}
fn default_manifest_name() -> String {
    "models.json".to_string()
}
fn default_dest() -> PathBuf {
    PathBuf::from("public").join("models")
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            fallbacks: default_fallbacks(),
            manifest_name: default_manifest_name(),
            user_agent: None,
            timeout_secs: None,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dest: default_dest(),
        }
    }
}

impl MirrorConfig {
    /// `User-Agent` header sent with every request
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| concat!("modelpull/", env!("CARGO_PKG_VERSION")).to_string())
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| {
            PullError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Get config file path
pub fn config_path() -> Result<PathBuf> {
    let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config)
    } else {
        dirs::config_dir()
            .ok_or_else(|| PullError::Config("Could not determine config directory".to_string()))?
    };

    Ok(config_dir.join("modelpull").join("config.toml"))
}
