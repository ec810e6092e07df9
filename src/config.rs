//! Configuration primitives for MarketBrief.
//!
//! Stored in a machine-readable TOML file located at:
//!   `$MARKETBRIEF_HOME/config/config.toml` when the variable is set, otherwise
//!   the OS data directory (`directories::BaseDirs`) + `MarketBrief/config/config.toml`.
//!
//! Every section falls back to defaults, so a missing or partial file is valid.

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Generation service settings (model, endpoint, timeout).
    #[serde(default)]
    pub generation: GenerationSettings,
    /// Log filter and output format.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Settings for the remote report generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative language API, without the trailing slash.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Wall-clock budget (ms) for a single acquisition attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Environment variable consulted for the API key after the credential store.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Whether the live search tool is attached to requests.
    #[serde(default = "default_search_enabled")]
    pub search_enabled: bool,
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            api_key_env: default_api_key_env(),
            search_enabled: default_search_enabled(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

const fn default_timeout_ms() -> u64 {
    120_000
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}

const fn default_search_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".into()
}

impl AppConfig {
    /// Reads the config at `path`, returning defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: AppConfig = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(cfg)
    }
}

/// Standard relative path to the config file (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "config.toml";

const CREDENTIAL_FILE_NAME: &str = "api_key";

/// Returns the root directory where MarketBrief stores data.
///
/// Order of precedence:
/// 1. `MARKETBRIEF_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var("MARKETBRIEF_HOME") {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("MarketBrief"))
}

pub fn config_file_path() -> Result<PathBuf> {
    Ok(workspace_root()?.join("config").join(CONFIG_FILE_NAME))
}

/// Location of the file-backed credential store.
pub fn credential_file_path() -> Result<PathBuf> {
    Ok(workspace_root()?
        .join("credentials")
        .join(CREDENTIAL_FILE_NAME))
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default() -> Result<AppConfig> {
    AppConfig::load_from(&config_file_path()?)
}
