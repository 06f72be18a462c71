use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Configuration file structure for circleci-actions.
///
/// Lets users pin API endpoints and common action parameters (project slug,
/// branch, ...) instead of repeating them on every invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// CircleCI API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,

    /// Parameter defaults, keyed by action parameter name (e.g. `project_slug`).
    ///
    /// Consulted after explicit values and environment variables, before
    /// built-in defaults.
    #[serde(default)]
    pub defaults: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// CircleCI API v2 base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// CircleCI API v1.1 base URL, used by the legacy actions
    #[serde(default = "default_legacy_base_url")]
    pub legacy_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            legacy_base_url: default_legacy_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://circleci.com/api/v2/".to_string()
}

fn default_legacy_base_url() -> String {
    "https://circleci.com/api/v1.1/".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("circleci-actions/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./circleci.toml
    /// 3. ./circleci.json
    /// 4. ./circleci.yaml
    /// 5. ./circleci.yml
    /// 6. `<user config dir>/circleci-actions/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                log::warn!("Config file not found: {}, using defaults", path.display());
                return Ok(Self::default());
            }
            return Self::load_from_path(path);
        }

        let candidates = ["circleci.toml", "circleci.json", "circleci.yaml", "circleci.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("circleci-actions").join("config.toml"))
}
